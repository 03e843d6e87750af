//! Command-line surface, shared by one-shot mode and the shell.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "board-harness")]
#[command(about = "Exploratory harness for the board backend API")]
pub struct Cli {
    /// Backend origin (the REST API is served under /api)
    #[arg(long, env = "BACKEND_URL", global = true)]
    pub backend_url: Option<String>,

    /// Model API base URL
    #[arg(long, env = "MODEL_API_URL", global = true)]
    pub model_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", global = true)]
    pub timeout: Option<u64>,

    /// Act as this user (sent as X-User-Id)
    #[arg(long, env = "HARNESS_USER_ID", global = true)]
    pub user_id: Option<i64>,

    /// Nickname shown for --user-id
    #[arg(long, env = "HARNESS_NICKNAME", global = true)]
    pub nickname: Option<String>,

    /// Send requests even when local form checks fail
    #[arg(long, global = true)]
    pub skip_checks: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run a client-side validator without calling the backend
    Validate {
        #[command(subcommand)]
        target: ValidateTarget,
    },
    /// Log in and print the session user
    Login { email: String, password: String },
    /// Create an account (local checks run first)
    Signup(SignupArgs),
    /// Post operations
    Posts {
        #[command(subcommand)]
        action: PostsCommand,
    },
    /// Comment operations
    Comments {
        #[command(subcommand)]
        action: CommentsCommand,
    },
    /// Analyze the sentiment of a text with the model API
    Sentiment {
        /// Use the Gemini-backed endpoint (Korean and English)
        #[arg(long)]
        gemini: bool,
        text: String,
    },
    /// Account operations
    Account {
        #[command(subcommand)]
        action: AccountCommand,
    },
    /// Check that the backend is up
    Health,
    /// Print every endpoint URL
    Endpoints,
    /// Interactive mode holding a session across commands
    Shell,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ValidateTarget {
    Email { value: String },
    Password { value: String },
    Nickname { value: String },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct SignupArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    /// Defaults to --password
    #[arg(long)]
    pub password_check: Option<String>,
    #[arg(long)]
    pub nickname: String,
    /// Image file uploaded before signing up
    #[arg(long, conflicts_with = "profile_image_url")]
    pub profile_image: Option<PathBuf>,
    /// Already uploaded profile image
    #[arg(long)]
    pub profile_image_url: Option<String>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PostArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub content: String,
    /// Image file uploaded (and classified) before saving
    #[arg(long, conflicts_with = "image_url")]
    pub image: Option<PathBuf>,
    #[arg(long)]
    pub image_url: Option<String>,
    /// Dog or Cat
    #[arg(long)]
    pub image_class: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PostsCommand {
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    Get { post_id: i64 },
    Create(PostArgs),
    Update {
        post_id: i64,
        #[command(flatten)]
        post: PostArgs,
    },
    Delete { post_id: i64 },
    Like { post_id: i64 },
    View { post_id: i64 },
    /// Upload an image and print the classifier result
    Upload { path: PathBuf },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CommentsCommand {
    List { post_id: i64 },
    Create { post_id: i64, content: String },
    Update { post_id: i64, comment_id: i64, content: String },
    Delete { post_id: i64, comment_id: i64 },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum AccountCommand {
    /// Delete the logged-in account
    Delete,
}

/// One line typed into the shell.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ShellCommand {
    /// Print the session user
    Whoami,
    /// Forget the session user
    Logout,
    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
    #[command(flatten)]
    Api(Command),
}
