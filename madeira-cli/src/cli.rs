use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(name = "madeira", version, about = "Wood volume calculator and quotes")]
pub struct Cli {
    /// JSON file backing the store.
    #[clap(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Directory where quote documents are written.
    #[clap(long, global = true)]
    pub reports_dir: Option<PathBuf>,

    /// Print results as JSON.
    #[clap(long, global = true)]
    pub json: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Register {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
        #[clap(long)]
        name: String,
    },
    Login {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    Logout,
    Whoami,
    /// Calculate without saving.
    Calc(CalcArgs),
    #[clap(subcommand)]
    Item(ItemCommand),
    #[clap(subcommand)]
    Quote(QuoteCommand),
    #[clap(subcommand)]
    Plan(PlanCommand),
    #[clap(subcommand)]
    Reset(ResetCommand),
    Suggest {
        #[clap(value_enum)]
        list: SuggestTarget,
        term: String,
    },
    #[clap(subcommand)]
    Terms(TermsCommand),
    #[clap(subcommand)]
    Settings(SettingsCommand),
    #[clap(subcommand)]
    Notifications(NotificationsCommand),
    #[clap(subcommand)]
    Profile(ProfileCommand),
    #[clap(subcommand)]
    Admin(AdminCommand),
    #[clap(subcommand)]
    Storage(StorageCommand),
}

#[derive(Args, Debug, Clone)]
pub struct CalcArgs {
    /// Thickness in cm.
    #[clap(long)]
    pub thickness: String,
    /// Width in cm.
    #[clap(long)]
    pub width: String,
    /// Length in cm.
    #[clap(long)]
    pub length: String,
    #[clap(long)]
    pub quantity: String,
    /// Pieces per package, 1 when omitted.
    #[clap(long)]
    pub package_quantity: Option<String>,
    /// Price per m³, e.g. "R$ 1.250,00" or 1250.
    #[clap(long)]
    pub price: String,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DetailsArgs {
    #[clap(long)]
    pub client: Option<String>,
    #[clap(long)]
    pub contact: Option<String>,
    #[clap(long)]
    pub terms: Option<String>,
    #[clap(long)]
    pub species: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ItemCommand {
    Add {
        #[clap(flatten)]
        calc: CalcArgs,
        #[clap(flatten)]
        details: DetailsArgs,
    },
    List,
    /// Replace the item at a 1-based position.
    Edit {
        position: usize,
        #[clap(flatten)]
        calc: CalcArgs,
        #[clap(flatten)]
        details: DetailsArgs,
    },
    Remove {
        position: usize,
    },
    Clear,
    /// Quote document for the current list, without saving it.
    Report {
        #[clap(flatten)]
        details: DetailsArgs,
        #[clap(long, default_value = "unit-price")]
        variant: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum QuoteCommand {
    Save,
    List,
    Show {
        id: String,
    },
    Update {
        id: String,
        #[clap(long)]
        client: Option<String>,
        #[clap(long)]
        contact: Option<String>,
        #[clap(long)]
        terms: Option<String>,
    },
    Delete {
        id: String,
    },
    /// Copy a saved quote back into the current list.
    Load {
        id: String,
    },
    Report {
        id: String,
        #[clap(long, default_value = "unit-price")]
        variant: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum PlanCommand {
    Show,
    Set { plan: String },
    /// Ask an administrator to activate a paid plan.
    Request { plan: String },
}

#[derive(Subcommand, Debug)]
pub enum ResetCommand {
    Request {
        #[clap(long)]
        email: String,
    },
    Confirm {
        #[clap(long)]
        email: String,
        #[clap(long)]
        code: String,
        #[clap(long)]
        password: String,
    },
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum SuggestTarget {
    Clients,
    Species,
    Terms,
}

#[derive(Subcommand, Debug)]
pub enum TermsCommand {
    List,
    Add { term: String },
    Edit { position: usize, term: String },
    Remove { position: usize },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    Show,
    Set { key: String, value: String },
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum NotificationsCommand {
    List {
        /// all, unread, read or a notification type.
        #[clap(long, default_value = "all")]
        filter: String,
    },
    Read { id: uuid::Uuid },
    ReadAll,
    Delete { id: uuid::Uuid },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    Show,
    Set {
        #[clap(long)]
        company: Option<String>,
        #[clap(long)]
        phone: Option<String>,
        #[clap(long)]
        address: Option<String>,
        #[clap(long)]
        email: Option<String>,
        #[clap(long)]
        cnpj: Option<String>,
    },
    Logo {
        path: PathBuf,
    },
    RemoveLogo,
    Export {
        #[clap(long)]
        output: Option<PathBuf>,
    },
    DeleteAccount {
        /// Required, the account cannot be recovered.
        #[clap(long)]
        confirm: bool,
    },
    Password {
        #[clap(long)]
        current: String,
        #[clap(long)]
        new: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    Unlock {
        #[clap(long)]
        password: String,
    },
    Lock,
    Pending,
    Approve { id: uuid::Uuid },
    Reject { id: uuid::Uuid },
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum StorageCommand {
    Export {
        #[clap(long)]
        output: Option<PathBuf>,
    },
    Import {
        file: PathBuf,
    },
    Stats,
}
