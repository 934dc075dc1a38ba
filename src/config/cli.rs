use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the Folio binary.
#[derive(Debug, Parser)]
#[command(
    name = "folio",
    version,
    about = "Manage portfolio projects, posts, messages and settings"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "FOLIO_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the backend project URL.
    #[arg(long = "backend-url", value_name = "URL", global = true)]
    pub backend_url: Option<String>,

    /// Override the backend anonymous key.
    #[arg(long = "anon-key", value_name = "KEY", global = true)]
    pub anon_key: Option<String>,

    /// Access token of the signed-in administrator. Prefer the environment
    /// variable to keep it out of shell history.
    #[arg(
        long = "access-token",
        hide = true,
        env = "FOLIO_ACCESS_TOKEN",
        hide_env_values = true,
        global = true
    )]
    pub access_token: Option<String>,

    /// Override the image bucket name.
    #[arg(long = "storage-bucket", value_name = "BUCKET", global = true)]
    pub storage_bucket: Option<String>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Portfolio projects.
    Projects(ProjectsArgs),
    /// Blog posts.
    Posts(PostsArgs),
    /// Messages received through the contact form.
    Messages(MessagesArgs),
    /// Site-wide settings.
    Settings(SettingsArgs),
    /// Submit the public contact form.
    Contact(ContactArgs),
    /// Upload an image for a project or post and print its public URL.
    Upload(UploadArgs),
    /// Show dashboard counters.
    Stats,
    /// Print the slug derived from a title.
    Slug {
        #[arg(value_name = "TEXT")]
        text: String,
    },
    /// Estimate the reading time of a post body.
    #[command(name = "reading-time")]
    ReadingTime {
        #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },
}

#[derive(Debug, Args, Clone)]
pub struct ProjectsArgs {
    #[command(subcommand)]
    pub action: ProjectsCmd,
}

#[derive(Debug, Subcommand, Clone)]
pub enum ProjectsCmd {
    /// List projects, newest first.
    List,
    /// Create a project.
    Create(Box<ProjectFieldArgs>),
    /// Change selected fields of a project.
    Update {
        #[arg(long)]
        id: String,
        #[command(flatten)]
        fields: Box<ProjectFieldArgs>,
    },
    /// Delete a project.
    Delete {
        #[arg(long)]
        id: String,
    },
}

#[derive(Debug, Args, Default, Clone)]
pub struct ProjectFieldArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub tagline: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub image: Option<String>,
    /// Comma-separated tags.
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,
    #[arg(long)]
    pub github_url: Option<String>,
    #[arg(long)]
    pub demo_url: Option<String>,
    #[arg(long)]
    pub language: Option<String>,
    #[arg(long)]
    pub language_color: Option<String>,
    #[arg(long)]
    pub stars: Option<u32>,
    #[arg(long)]
    pub forks: Option<u32>,
    #[arg(long)]
    pub views: Option<String>,
    #[arg(long)]
    pub logo: Option<String>,
    #[arg(long)]
    pub gradient: Option<String>,
    /// Featured, Production, Active, Beta, Stable or any other label.
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub is_ai: Option<bool>,
}

#[derive(Debug, Args, Clone)]
pub struct PostsArgs {
    #[command(subcommand)]
    pub action: PostsCmd,
}

#[derive(Debug, Subcommand, Clone)]
pub enum PostsCmd {
    /// List posts, newest first.
    List {
        /// Only published posts.
        #[arg(long, default_value_t = false)]
        published: bool,
        /// Case-insensitive search over title, content and excerpt
        /// (implies --published).
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a post by slug.
    Show { slug: String },
    /// Create a post. The slug is derived from the title unless given.
    Create(Box<PostFieldArgs>),
    /// Change selected fields of a post.
    Update {
        #[arg(long)]
        id: i64,
        #[command(flatten)]
        fields: Box<PostFieldArgs>,
    },
    /// Delete a post.
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Args, Default, Clone)]
pub struct PostFieldArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long, conflicts_with = "content_file")]
    pub content: Option<String>,
    /// Read the post body from a file.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub content_file: Option<PathBuf>,
    #[arg(long)]
    pub slug: Option<String>,
    #[arg(long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub published: Option<bool>,
    #[arg(long)]
    pub excerpt: Option<String>,
    #[arg(long)]
    pub image_url: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub category_color: Option<String>,
    /// Comma-separated tags.
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Args, Clone)]
pub struct MessagesArgs {
    #[command(subcommand)]
    pub action: MessagesCmd,
}

#[derive(Debug, Subcommand, Clone)]
pub enum MessagesCmd {
    /// List messages, newest first.
    List {
        /// Only messages not yet marked as read.
        #[arg(long, default_value_t = false)]
        unread: bool,
    },
    /// Mark a message as read.
    Read {
        #[arg(long)]
        id: i64,
    },
    /// Delete a message.
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Args, Clone)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub action: SettingsCmd,
}

#[derive(Debug, Subcommand, Clone)]
pub enum SettingsCmd {
    /// Show the saved settings.
    Show,
    /// Save settings, creating the row on first use.
    Set(SettingsFieldArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct SettingsFieldArgs {
    #[arg(long)]
    pub site_title: Option<String>,
    #[arg(long)]
    pub site_description: Option<String>,
    #[arg(long)]
    pub contact_email: Option<String>,
    #[arg(long)]
    pub github: Option<String>,
    #[arg(long)]
    pub linkedin: Option<String>,
    #[arg(long)]
    pub discord: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ContactArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub message: String,
    #[arg(long = "honey", hide = true)]
    pub honeypot: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AssetKindArg {
    Projects,
    Posts,
}

#[derive(Debug, Args, Clone)]
pub struct UploadArgs {
    #[arg(value_enum)]
    pub kind: AssetKindArg,
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}
