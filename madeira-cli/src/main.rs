mod cli;

use std::collections::BTreeMap;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use madeira_core::application::calculator::{self, CalculationForm};
use madeira_core::data::suggestion_repository::SuggestionList;
use madeira_core::domain::notification::{NotificationFilter, NotificationKind, relative_time};
use madeira_core::domain::profile::ProfileUpdate;
use madeira_core::domain::quote::{Quote, QuoteUpdate};
use madeira_core::domain::user::UserView;
use madeira_core::domain::wood::{ItemDetails, Totals, WoodItem};
use madeira_core::infrastructure::clock::SystemClock;
use madeira_core::infrastructure::config::AppConfig;
use madeira_core::infrastructure::logging::init_logging;
use madeira_core::infrastructure::report_viewer::FileViewer;
use madeira_core::infrastructure::storage::open_storage;
use madeira_core::presentation::format::{
    format_currency, format_date, format_datetime, format_volume,
};
use madeira_core::presentation::report::{ReportClient, ReportVariant};
use madeira_core::{AppContext, DomainError};
use serde::Serialize;
use tracing::error;

use crate::cli::{
    AdminCommand, CalcArgs, Cli, Command, DetailsArgs, ItemCommand, NotificationsCommand,
    PlanCommand, ProfileCommand, QuoteCommand, ResetCommand, SettingsCommand, StorageCommand,
    SuggestTarget, TermsCommand,
};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    let json = args.json;

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err:#}");
            return ExitCode::from(1);
        }
    };
    init_logging(&config.log_filter);

    match run(args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_error(&err, json),
    }
}

fn report_error(err: &anyhow::Error, json: bool) -> ExitCode {
    match err.downcast_ref::<DomainError>() {
        Some(domain) => {
            if json {
                eprintln!("{}", domain.to_json());
            } else {
                eprintln!("error: {domain}");
            }
            ExitCode::from(domain.exit_code())
        }
        None => {
            error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

struct Output {
    json: bool,
}

impl Output {
    /// JSON when requested, otherwise the human rendering.
    fn show<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }

    fn done(&self, message: &str) {
        if self.json {
            println!("{}", serde_json::json!({ "ok": true, "message": message }));
        } else {
            println!("{message}");
        }
    }
}

async fn run(args: Cli, mut config: AppConfig) -> anyhow::Result<()> {
    if let Some(data_file) = args.data_file {
        config.data_file = data_file;
    }
    if let Some(reports_dir) = args.reports_dir {
        config.reports_dir = reports_dir;
    }

    let storage = open_storage(&config.data_file)
        .await
        .with_context(|| format!("failed to open {}", config.data_file.display()))?;
    let ctx = AppContext::new(
        storage,
        Arc::new(SystemClock),
        Arc::new(FileViewer::new(config.reports_dir.clone())),
        config.admin_password.clone(),
    );
    let out = Output { json: args.json };

    match args.command {
        Command::Register {
            email,
            password,
            name,
        } => {
            let user = ctx.auth.register(email, password, name).await?;
            ctx.notifications
                .add(
                    NotificationKind::System,
                    "Bem-vindo!",
                    "Sua conta foi criada. Aproveite seus 30 dias grátis.",
                )
                .await?;
            out.show(&UserView::from(&user), print_user)?;
        }
        Command::Login { email, password } => {
            let user = ctx.auth.login(&email, &password).await?;
            out.show(&UserView::from(&user), print_user)?;
        }
        Command::Logout => {
            ctx.auth.logout().await?;
            out.done("Logged out.");
        }
        Command::Whoami => {
            let user = ctx.auth.require_user().await?;
            out.show(&UserView::from(&user), print_user)?;
        }
        Command::Calc(calc) => {
            let (input, result) = calculator::calculate(&to_form(calc)).map_err(DomainError::from)?;
            out.show(&calculator::display(&input, &result), |shown| {
                println!("Volume unitário: {}", shown.unit_volume);
                println!("{}: {}", shown.quantity_label, result.total_quantity);
                println!("Volume total:    {}", shown.total_volume);
                println!("Valor:           {}", shown.cost);
            })?;
        }
        Command::Item(cmd) => item_command(&ctx, &out, cmd).await?,
        Command::Quote(cmd) => quote_command(&ctx, &out, cmd).await?,
        Command::Plan(cmd) => plan_command(&ctx, &out, cmd).await?,
        Command::Reset(cmd) => match cmd {
            ResetCommand::Request { email } => {
                let code = ctx.auth.request_password_reset(&email).await?;
                out.show(&serde_json::json!({ "code": code }), |_| {
                    println!("Reset code: {code} (valid for 30 minutes)");
                })?;
            }
            ResetCommand::Confirm {
                email,
                code,
                password,
            } => {
                ctx.auth.reset_password(&email, &code, &password).await?;
                out.done("Password updated.");
            }
        },
        Command::Suggest { list, term } => {
            let list = match list {
                SuggestTarget::Clients => SuggestionList::Clients,
                SuggestTarget::Species => SuggestionList::Species,
                SuggestTarget::Terms => SuggestionList::PaymentTerms,
            };
            let hits = ctx.suggestions.suggest(list, &term).await?;
            out.show(&hits, |hits| hits.iter().for_each(|h| println!("{h}")))?;
        }
        Command::Terms(cmd) => terms_command(&ctx, &out, cmd).await?,
        Command::Settings(cmd) => {
            let settings = match cmd {
                SettingsCommand::Show => ctx.settings.get().await?,
                SettingsCommand::Set { key, value } => ctx.settings.set(&key, &value).await?,
                SettingsCommand::Reset => ctx.settings.reset().await?,
            };
            out.show(&settings, |s| {
                if let Ok(serde_json::Value::Object(map)) = serde_json::to_value(s) {
                    for (key, value) in map {
                        println!("{key:<22} {value}");
                    }
                }
            })?;
        }
        Command::Notifications(cmd) => notifications_command(&ctx, &out, cmd).await?,
        Command::Profile(cmd) => profile_command(&ctx, &out, cmd).await?,
        Command::Admin(cmd) => admin_command(&ctx, &out, cmd).await?,
        Command::Storage(cmd) => storage_command(&ctx, &out, cmd).await?,
    }
    Ok(())
}

async fn item_command(ctx: &AppContext, out: &Output, cmd: ItemCommand) -> anyhow::Result<()> {
    match cmd {
        ItemCommand::Add { calc, details } => {
            let item = ctx.quotes.add_item(to_details(details), &to_form(calc)).await?;
            out.show(&item, |item| {
                println!("Added: {}", describe_item(item));
            })?;
        }
        ItemCommand::List => {
            let items = ctx.quotes.current_items().await?;
            let totals = ctx.quotes.list_totals().await?;
            out.show(&serde_json::json!({ "items": items, "totals": totals }), |_| {
                print_items(&items, &totals);
            })?;
        }
        ItemCommand::Edit {
            position,
            calc,
            details,
        } => {
            let item = ctx
                .quotes
                .replace_item(to_index(position)?, to_details(details), &to_form(calc))
                .await?;
            out.show(&item, |item| println!("Updated: {}", describe_item(item)))?;
        }
        ItemCommand::Remove { position } => {
            let item = ctx.quotes.remove_item(to_index(position)?).await?;
            out.show(&item, |item| println!("Removed: {}", describe_item(item)))?;
        }
        ItemCommand::Clear => {
            ctx.quotes.clear_items().await?;
            out.done("List cleared.");
        }
        ItemCommand::Report { details, variant } => {
            let user = ctx.auth.require_user().await?;
            let details = to_details(details);
            let client = ReportClient {
                name: details.client_name,
                contact: details.client_contact,
                payment_terms: details.payment_terms,
            };
            let location = ctx
                .reports
                .open_current_list(user.id, &client, parse_variant(&variant)?)
                .await?;
            out.show(&serde_json::json!({ "report": location }), |_| {
                println!("Report written to {location}");
            })?;
        }
    }
    Ok(())
}

async fn quote_command(ctx: &AppContext, out: &Output, cmd: QuoteCommand) -> anyhow::Result<()> {
    let user = ctx.auth.require_user().await?;
    match cmd {
        QuoteCommand::Save => {
            let quote = ctx.quotes.save_quote(user.id).await?;
            ctx.notifications
                .add(
                    NotificationKind::Calculation,
                    "Orçamento salvo",
                    &format!("{} com {} itens", quote.number(), quote.items.len()),
                )
                .await?;
            out.show(&quote, print_quote)?;
        }
        QuoteCommand::List => {
            let quotes = ctx.quotes.list_quotes(user.id).await?;
            out.show(&quotes, |quotes| {
                if quotes.is_empty() {
                    println!("No saved quotes.");
                }
                for quote in quotes {
                    let totals = quote.totals();
                    println!(
                        "{}  {}  {:<24} {:>3} itens  {:>12}  {:>14}  ({})",
                        quote.number(),
                        format_date(quote.created_at),
                        or_dash(&quote.client_name),
                        totals.items,
                        format_volume(totals.total_volume),
                        format_currency(totals.total_cost),
                        quote.id
                    );
                }
            })?;
        }
        QuoteCommand::Show { id } => {
            let id = ctx.quotes.resolve_reference(user.id, &id).await?;
            let quote = ctx.quotes.get_quote(user.id, id).await?;
            out.show(&quote, print_quote)?;
        }
        QuoteCommand::Update {
            id,
            client,
            contact,
            terms,
        } => {
            let id = ctx.quotes.resolve_reference(user.id, &id).await?;
            let update = QuoteUpdate {
                client_name: client,
                client_contact: contact,
                payment_terms: terms,
                items: None,
            };
            if update.is_empty() {
                return Err(DomainError::Validation("nothing to update".into()).into());
            }
            let quote = ctx
                .quotes
                .update_quote(user.id, id, update)
                .await?
                .ok_or(DomainError::QuoteNotFound(id))?;
            out.show(&quote, print_quote)?;
        }
        QuoteCommand::Delete { id } => {
            let id = ctx.quotes.resolve_reference(user.id, &id).await?;
            if !ctx.quotes.delete_quote(user.id, id).await? {
                return Err(DomainError::QuoteNotFound(id).into());
            }
            out.done("Quote deleted.");
        }
        QuoteCommand::Load { id } => {
            let id = ctx.quotes.resolve_reference(user.id, &id).await?;
            let items = ctx.quotes.load_quote_into_list(user.id, id).await?;
            out.show(&items, |items| {
                println!("{} items loaded into the current list.", items.len());
            })?;
        }
        QuoteCommand::Report { id, variant } => {
            let id = ctx.quotes.resolve_reference(user.id, &id).await?;
            let location = ctx
                .reports
                .open(user.id, id, parse_variant(&variant)?)
                .await?;
            out.show(&serde_json::json!({ "report": location }), |_| {
                println!("Report written to {location}");
            })?;
        }
    }
    Ok(())
}

async fn plan_command(ctx: &AppContext, out: &Output, cmd: PlanCommand) -> anyhow::Result<()> {
    let user = ctx.auth.require_user().await?;
    match cmd {
        PlanCommand::Show => {
            let details = ctx.auth.plan_details(&user);
            out.show(&details, |d| {
                println!("{} ({})", d.info.name, d.info.kind);
                println!("Preço: {}", format_currency(d.info.price));
                if let (Some(start), Some(end)) = (d.record.start_date, d.record.end_date) {
                    println!("Período: {} a {}", format_date(start), format_date(end));
                }
                println!(
                    "Status: {} ({} dias restantes)",
                    if d.active { "ativo" } else { "inativo" },
                    d.days_left
                );
                for feature in d.info.features {
                    println!("  - {feature}");
                }
            })?;
        }
        PlanCommand::Set { plan } => {
            let user = ctx.auth.update_plan(user.id, &plan).await?;
            ctx.notifications
                .add(
                    NotificationKind::Plan,
                    "Plano atualizado",
                    user.plan.kind.info().name,
                )
                .await?;
            out.show(&UserView::from(&user), print_user)?;
        }
        PlanCommand::Request { plan } => {
            let request = ctx.admin.request_plan(user.id, &plan).await?;
            out.show(&request, |r| {
                println!(
                    "Request {} for {} ({}) sent for approval.",
                    r.id,
                    r.plan.info().name,
                    format_currency(r.price)
                );
            })?;
        }
    }
    Ok(())
}

async fn terms_command(ctx: &AppContext, out: &Output, cmd: TermsCommand) -> anyhow::Result<()> {
    let terms = match cmd {
        TermsCommand::List => ctx.suggestions.payment_terms().await?,
        TermsCommand::Add { term } => ctx.suggestions.add_payment_term(&term).await?,
        TermsCommand::Edit { position, term } => {
            ctx.suggestions
                .edit_payment_term(to_index(position)?, &term)
                .await?
        }
        TermsCommand::Remove { position } => {
            ctx.suggestions
                .delete_payment_term(to_index(position)?)
                .await?;
            ctx.suggestions.payment_terms().await?
        }
    };
    out.show(&terms, |terms| {
        for (i, term) in terms.iter().enumerate() {
            let marker = if madeira_core::application::suggestion_service::is_default_term(term) {
                " (padrão)"
            } else {
                ""
            };
            println!("{:>2}. {term}{marker}", i + 1);
        }
    })
}

async fn notifications_command(
    ctx: &AppContext,
    out: &Output,
    cmd: NotificationsCommand,
) -> anyhow::Result<()> {
    match cmd {
        NotificationsCommand::List { filter } => {
            let filter: NotificationFilter = filter.parse()?;
            let list = ctx.notifications.list(filter).await?;
            let now = ctx.notifications.now();
            out.show(&list, |list| {
                if list.is_empty() {
                    println!("No notifications.");
                }
                for n in list {
                    println!(
                        "{} {:<14} {:<12} {}: {}  ({})",
                        if n.read { " " } else { "*" },
                        relative_time(n.time, now),
                        n.kind,
                        n.title,
                        n.message,
                        n.id
                    );
                }
            })?;
        }
        NotificationsCommand::Read { id } => {
            ctx.notifications.mark_read(id).await?;
            out.done("Marked as read.");
        }
        NotificationsCommand::ReadAll => {
            let count = ctx.notifications.mark_all_read().await?;
            out.done(&format!("{count} notifications marked as read."));
        }
        NotificationsCommand::Delete { id } => {
            ctx.notifications.delete(id).await?;
            out.done("Notification deleted.");
        }
    }
    Ok(())
}

async fn profile_command(ctx: &AppContext, out: &Output, cmd: ProfileCommand) -> anyhow::Result<()> {
    let user = ctx.auth.require_user().await?;
    match cmd {
        ProfileCommand::Show => {
            let profile = ctx.profiles.get(user.id).await?;
            out.show(&profile, |p| {
                println!("Empresa:  {}", or_dash(&p.company));
                println!("Telefone: {}", or_dash(&p.phone));
                println!("Endereço: {}", or_dash(&p.address));
                println!("Email:    {}", or_dash(&p.email));
                println!("CNPJ:     {}", or_dash(&p.cnpj));
                println!("Logo:     {}", if p.logo.is_empty() { "não" } else { "sim" });
            })?;
        }
        ProfileCommand::Set {
            company,
            phone,
            address,
            email,
            cnpj,
        } => {
            let profile = ctx
                .profiles
                .update(
                    user.id,
                    ProfileUpdate {
                        company,
                        phone,
                        address,
                        email,
                        cnpj,
                    },
                )
                .await?;
            ctx.notifications
                .add(NotificationKind::Profile, "Perfil atualizado", "Dados da empresa salvos")
                .await?;
            out.show(&profile, |_| println!("Profile saved."))?;
        }
        ProfileCommand::Logo { path } => {
            let mime = logo_mime(&path)?;
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            ctx.profiles.set_logo(user.id, &bytes, mime).await?;
            out.done("Logo stored.");
        }
        ProfileCommand::RemoveLogo => {
            ctx.profiles.remove_logo(user.id).await?;
            out.done("Logo removed.");
        }
        ProfileCommand::Export { output } => {
            let export = ctx.accounts.export_account(user.id).await?;
            let body = serde_json::to_string_pretty(&export)?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, body)
                        .await
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    out.done(&format!("Account exported to {}", path.display()));
                }
                None => println!("{body}"),
            }
        }
        ProfileCommand::DeleteAccount { confirm } => {
            if !confirm {
                return Err(DomainError::Validation(
                    "pass --confirm to delete the account".into(),
                )
                .into());
            }
            ctx.accounts.delete_account(user.id).await?;
            out.done("Account deleted.");
        }
        ProfileCommand::Password { current, new } => {
            ctx.auth.change_password(user.id, &current, &new).await?;
            out.done("Password changed.");
        }
    }
    Ok(())
}

async fn admin_command(ctx: &AppContext, out: &Output, cmd: AdminCommand) -> anyhow::Result<()> {
    match cmd {
        AdminCommand::Unlock { password } => {
            ctx.admin.unlock(&password).await?;
            out.done("Admin session open for 24 hours.");
        }
        AdminCommand::Lock => {
            ctx.admin.lock().await?;
            out.done("Admin session closed.");
        }
        AdminCommand::Pending => {
            let pending = ctx.admin.pending().await?;
            out.show(&pending, |pending| {
                if pending.is_empty() {
                    println!("No pending requests.");
                }
                for r in pending {
                    println!(
                        "{}  {:<20} {:<8} {:>10}  {}",
                        r.id,
                        r.user_name,
                        r.plan,
                        format_currency(r.price),
                        format_datetime(r.requested_at)
                    );
                }
            })?;
        }
        AdminCommand::Approve { id } => {
            let request = ctx.admin.approve(id).await?;
            out.show(&request, |r| println!("Approved {} for {}.", r.plan, r.user_name))?;
        }
        AdminCommand::Reject { id } => {
            let request = ctx.admin.reject(id).await?;
            out.show(&request, |r| println!("Rejected {} for {}.", r.plan, r.user_name))?;
        }
        AdminCommand::Stats => {
            let stats = ctx.admin.stats().await?;
            out.show(&stats, |s| {
                println!("Usuários:            {}", s.users);
                println!("Planos ativos:       {}", s.active_plans);
                println!("Planos pagos:        {}", s.paid_plans);
                println!("Pedidos pendentes:   {}", s.pending_requests);
            })?;
        }
    }
    Ok(())
}

async fn storage_command(ctx: &AppContext, out: &Output, cmd: StorageCommand) -> anyhow::Result<()> {
    match cmd {
        StorageCommand::Export { output } => {
            let dump = ctx.storage.export().await.map_err(DomainError::from)?;
            let body = serde_json::to_string_pretty(&dump)?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, body)
                        .await
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    out.done(&format!("{} keys exported to {}", dump.len(), path.display()));
                }
                None => println!("{body}"),
            }
        }
        StorageCommand::Import { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let dump: BTreeMap<String, serde_json::Value> = serde_json::from_str(&text)
                .map_err(|e| DomainError::Validation(format!("invalid backup file: {e}")))?;
            let count = ctx.storage.import(&dump).await.map_err(DomainError::from)?;
            out.done(&format!("{count} keys imported."));
        }
        StorageCommand::Stats => {
            let stats = ctx.storage.stats().await.map_err(DomainError::from)?;
            out.show(&stats, |s| {
                println!("Keys:  {}", s.total_keys);
                println!("Bytes: {}", s.total_bytes);
            })?;
        }
    }
    Ok(())
}

fn to_form(calc: CalcArgs) -> CalculationForm {
    CalculationForm {
        thickness: calc.thickness,
        width: calc.width,
        length: calc.length,
        quantity: calc.quantity,
        package_quantity: calc.package_quantity.unwrap_or_default(),
        price: calc.price,
    }
}

fn to_details(details: DetailsArgs) -> ItemDetails {
    ItemDetails {
        client_name: details.client.unwrap_or_default(),
        client_contact: details.contact.unwrap_or_default(),
        payment_terms: details.terms.unwrap_or_default(),
        species: details.species.unwrap_or_default(),
    }
}

/// Positions on the command line start at 1.
fn to_index(position: usize) -> Result<usize, DomainError> {
    position
        .checked_sub(1)
        .ok_or_else(|| DomainError::Validation("positions start at 1".into()))
}

fn parse_variant(text: &str) -> Result<ReportVariant, DomainError> {
    text.parse().map_err(DomainError::Validation)
}

fn logo_mime(path: &Path) -> Result<&'static str, DomainError> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(madeira_core::application::profile_service::mime_for_extension)
        .ok_or_else(|| {
            DomainError::Validation(format!("{} is not a supported image", path.display()))
        })
}

fn or_dash(text: &str) -> &str {
    if text.trim().is_empty() { "-" } else { text }
}

fn describe_item(item: &WoodItem) -> String {
    let calc = item.calculation();
    format!(
        "{} | {} {} | {} | {} | {}",
        item.size_label(),
        calc.total_quantity,
        calculator::quantity_label(item.input.package_quantity),
        format_volume(calc.total_volume),
        or_dash(&item.details.species),
        format_currency(calc.cost)
    )
}

fn print_items(items: &[WoodItem], totals: &Totals) {
    if items.is_empty() {
        println!("The list is empty.");
        return;
    }
    for (i, item) in items.iter().enumerate() {
        println!("{:>3}. {}", i + 1, describe_item(item));
    }
    println!(
        "Total: {} itens | {} | {}",
        totals.items,
        format_volume(totals.total_volume),
        format_currency(totals.total_cost)
    );
}

fn print_quote(quote: &Quote) {
    println!("{}  ({})", quote.number(), quote.id);
    println!("Data:      {}", format_datetime(quote.created_at));
    println!("Cliente:   {}", or_dash(&quote.client_name));
    println!("Contato:   {}", or_dash(&quote.client_contact));
    println!("Pagamento: {}", or_dash(&quote.payment_terms));
    print_items(&quote.items, &quote.totals());
}

fn print_user(user: &UserView) {
    println!("{} <{}>", user.name, user.email);
    println!("Plano: {} ({})", user.plan.kind.info().name, user.plan.kind);
    if let Some(end) = user.plan.end_date {
        println!("Válido até: {}", format_date(end));
    }
}

