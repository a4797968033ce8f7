use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use playmgr::{
    cli, config, error,
    logging::{self, COMMAND_FILTER, SERVER_FILTER},
    management::PreferenceList,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP API and the daily auto-sort
    Serve,

    /// Sort a playlist by album release date, newest first
    Sort(PlaylistOptions),

    /// Shuffle a playlist
    Shuffle(PlaylistOptions),

    /// Replace the content of one playlist with another's
    Copy(CopyOptions),

    /// Remove every track from a playlist
    Clear(PlaylistOptions),

    /// Show a playlist and its tracks
    Show(PlaylistOptions),

    /// List the user's playlists
    Playlists(UserOption),

    /// Show the user's top tracks or artists over the short, medium and long term
    Top(TopOptions),

    /// Playlists sorted automatically every day
    #[command(subcommand)]
    AutoSort(AutoSortSubcommand),

    /// Favorite playlists
    #[command(subcommand)]
    Favorites(PreferenceSubcommand),

    /// Manage stored users
    #[command(subcommand)]
    Users(UsersSubcommand),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct UserOption {
    /// Id of the user in the user store
    #[clap(long, short)]
    pub user: String,
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistOptions {
    /// Playlist id, or `liked-songs`
    pub playlist: String,

    #[clap(flatten)]
    pub user: UserOption,
}

#[derive(Parser, Debug, Clone)]
pub struct CopyOptions {
    /// Playlist id, or `liked-songs`
    pub source: String,

    /// Playlist id, `liked-songs`, or `new-playlist`
    pub destination: String,

    #[clap(flatten)]
    pub user: UserOption,
}

#[derive(Parser, Debug, Clone)]
pub struct TopOptions {
    /// `tracks` or `artists`
    pub kind: String,

    #[clap(flatten)]
    pub user: UserOption,
}

#[derive(Parser, Debug, Clone)]
pub struct PreferenceOptions {
    pub playlist: String,

    #[clap(flatten)]
    pub user: UserOption,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AutoSortSubcommand {
    /// Sort every opted-in playlist of every user now
    Run,
    /// Opt a playlist into the daily sort
    Add(PreferenceOptions),
    /// Opt a playlist out of the daily sort
    Remove(PreferenceOptions),
}

#[derive(Subcommand, Debug, Clone)]
pub enum PreferenceSubcommand {
    /// Mark a playlist as favorite
    Add(PreferenceOptions),
    /// Unmark a favorite playlist
    Remove(PreferenceOptions),
}

#[derive(Subcommand, Debug, Clone)]
pub enum UsersSubcommand {
    /// Create or update a user
    Add(AddUserOptions),
    /// List stored users
    List,
}

#[derive(Parser, Debug, Clone)]
pub struct AddUserOptions {
    #[clap(long)]
    pub id: String,
    #[clap(long)]
    pub spotify_user_id: String,
    #[clap(long)]
    pub username: String,
    #[clap(long)]
    pub email: Option<String>,
    /// Refresh token obtained through the Spotify authorization flow
    #[clap(long)]
    pub refresh_token: Option<String>,
    #[clap(long)]
    pub access_token: Option<String>,
    #[clap(long)]
    pub scope: Option<String>,
    /// Lifetime of the access token in seconds
    #[clap(long, default_value_t = 3600)]
    pub expires_in: u64,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    let filter = match cli.command {
        Command::Serve => SERVER_FILTER,
        _ => COMMAND_FILTER,
    };
    logging::init_logging(config::log_format(), filter);

    match cli.command {
        Command::Serve => cli::serve().await,
        Command::Sort(opt) => cli::sort(opt.user.user, opt.playlist).await,
        Command::Shuffle(opt) => cli::shuffle(opt.user.user, opt.playlist).await,
        Command::Copy(opt) => cli::copy(opt.user.user, opt.source, opt.destination).await,
        Command::Clear(opt) => cli::clear(opt.user.user, opt.playlist).await,
        Command::Show(opt) => cli::show(opt.user.user, opt.playlist).await,
        Command::Playlists(opt) => cli::playlists(opt.user).await,
        Command::Top(opt) => cli::top(opt.user.user, opt.kind).await,

        Command::AutoSort(sub) => match sub {
            AutoSortSubcommand::Run => cli::run_auto_sort().await,
            AutoSortSubcommand::Add(opt) => {
                cli::update_preference(opt.user.user, PreferenceList::AutoSort, opt.playlist, true)
                    .await
            }
            AutoSortSubcommand::Remove(opt) => {
                cli::update_preference(opt.user.user, PreferenceList::AutoSort, opt.playlist, false)
                    .await
            }
        },

        Command::Favorites(sub) => match sub {
            PreferenceSubcommand::Add(opt) => {
                cli::update_preference(opt.user.user, PreferenceList::Favorites, opt.playlist, true)
                    .await
            }
            PreferenceSubcommand::Remove(opt) => {
                cli::update_preference(
                    opt.user.user,
                    PreferenceList::Favorites,
                    opt.playlist,
                    false,
                )
                .await
            }
        },

        Command::Users(sub) => match sub {
            UsersSubcommand::Add(opt) => {
                cli::add_user(cli::NewUser {
                    id: opt.id,
                    spotify_user_id: opt.spotify_user_id,
                    username: opt.username,
                    email: opt.email,
                    access_token: opt.access_token,
                    refresh_token: opt.refresh_token,
                    scope: opt.scope,
                    expires_in: opt.expires_in,
                })
                .await
            }
            UsersSubcommand::List => cli::list_users().await,
        },

        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
