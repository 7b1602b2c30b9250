use anyhow::{Context, Error};
use picturas_session::{Auth, Config, Navigation, Route, Session};
use std::{path::PathBuf, sync::Arc};
use structopt::StructOpt;
use url::Url;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::from_args();

    log::debug!("Starting application with {:#?}", args);

    let config = args.config();
    let navigator = |route: Route| log::info!("Navigating to {}", route);
    let auth = Auth::from_config(&config, Arc::new(navigator))
        .context("Unable to set up the API client")?;

    match args.cmd {
        Command::Register {
            name,
            email,
            password,
        } => {
            let session = auth.register(&name, &email, &password).await?;
            println!("Registered and logged in as {}", session.name);
        },
        Command::Login { email, password } => {
            let session = auth.login(&email, &password).await?;
            println!("Logged in as {} <{}>", session.name, session.email);
        },
        Command::Logout => {
            if let Err(e) = auth.logout().await {
                eprintln!("Warning: {}", e.user_message());
            }
            println!("Logged out");
        },
        Command::Whoami => {
            print_session(&auth.refresh_profile().await?);
        },
        Command::Status => {
            print_session(&auth.session());
        },
        Command::ChangePassword {
            current_password,
            new_password,
        } => {
            auth.change_password(&current_password, &new_password)
                .await?;
            println!("Password changed");
        },
        Command::Route { path } => {
            let route = Route::from_path(&path)
                .with_context(|| format!("\"{}\" isn't a known route", path))?;

            match auth.visit(route) {
                Navigation::Allow => println!("{} is allowed", route),
                Navigation::Redirect(target) => {
                    println!("{} redirects to {}", route, target)
                },
            }
        },
    }

    Ok(())
}

fn print_session(session: &Session) {
    if session.is_logged_in() {
        let plan = if session.premium { "premium" } else { "free" };
        println!(
            "{} <{}> ({} plan, {})",
            session.name, session.email, plan, session.uuid
        );
    } else {
        println!("Not logged in");
    }
}

#[derive(Debug, StructOpt)]
#[structopt(about = "Manage your Picturas session from the command line")]
struct Args {
    #[structopt(
        long = "api",
        env = "PICTURAS_API_URL",
        default_value = "http://localhost:80/api/v1/",
        help = "The users API's base URL"
    )]
    api: Url,
    #[structopt(
        long = "state-dir",
        env = "PICTURAS_STATE_DIR",
        parse(from_os_str),
        help = "Where to keep the session between runs"
    )]
    state_dir: Option<PathBuf>,
    #[structopt(subcommand)]
    cmd: Command,
}

impl Args {
    fn config(&self) -> Config {
        let config = Config::new(self.api.clone());

        match self.state_dir {
            Some(ref dir) => config.with_state_dir(dir),
            None => config,
        }
    }
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Create an account and log into it
    Register {
        #[structopt(short = "n", long = "name")]
        name: String,
        #[structopt(short = "e", long = "email")]
        email: String,
        #[structopt(short = "p", long = "password")]
        password: String,
    },
    /// Log into an existing account
    Login {
        #[structopt(short = "e", long = "email")]
        email: String,
        #[structopt(short = "p", long = "password")]
        password: String,
    },
    /// Log out, here and on the server
    Logout,
    /// Ask the server who you are
    Whoami,
    /// Show the locally stored session
    Status,
    /// Change your password
    ChangePassword {
        #[structopt(long = "current")]
        current_password: String,
        #[structopt(long = "new")]
        new_password: String,
    },
    /// Check whether a route may be visited
    Route { path: String },
}
