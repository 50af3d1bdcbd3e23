//! Management commands: migrations, default data, developer accounts, CSV
//! imports and the organisation registry sync.

use std::ffi::OsString;
use std::io::{self, Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cap_std::{ambient_authority, fs::Dir};
use clap::{Parser, Subcommand};
use ortho_config::OrthoConfig as _;
use sha2::{Digest, Sha256};
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use wies::domain::{
    AllowedEmailDomains, FilterOrderService, ImportService, LabelService, OrganizationSyncService,
    RegistryEntry, SyncOptions, UserService,
};
use wies::outbound::persistence::{
    DbPool, DieselConfigRepository, DieselEventRepository, DieselImportRepository,
    DieselLabelRepository, DieselOrganizationRepository, DieselUserRepository, PoolConfig,
    run_migrations,
};
use wies::settings::AppSettings;

/// `wies-manage` command arguments.
#[derive(Debug, Parser)]
#[command(name = "wies-manage", about = "Wies management commands", version)]
struct CliArgs {
    /// Database path. Falls back to `WIES_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "path", global = true)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations.
    Migrate,
    /// Create the default label categories and labels.
    Setup,
    /// Create a superuser for local development.
    AddDeveloperUser {
        /// E-mail address used to sign in.
        #[arg(long, default_value = "dev@rijksoverheid.nl")]
        email: String,
        /// Given name.
        #[arg(long, default_value = "Developer")]
        first_name: String,
        /// Family name.
        #[arg(long, default_value = "Wies")]
        last_name: String,
    },
    /// Import placements from a CSV export.
    ImportPlacements {
        /// CSV file.
        file: PathBuf,
    },
    /// Import users from CSV.
    ImportUsers {
        /// CSV file.
        file: PathBuf,
    },
    /// Synchronise organisations with the registry's `exportOO.xml`.
    SyncOrganizations {
        /// Export downloaded from organisaties.overheid.nl.
        file: PathBuf,
        /// Report changes without writing them.
        #[arg(long)]
        dry_run: bool,
        /// Only top-level entries with this registry type, e.g. `Ministerie`.
        #[arg(long = "type", value_name = "type")]
        filter_type: Option<String>,
    },
}

fn main() -> io::Result<()> {
    if let Err(e) = fmt().with_env_filter(EnvFilter::from_default_env()).try_init() {
        warn!(error = %e, "tracing init failed");
    }
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = AppSettings::load_from_iter([OsString::from("wies-manage")])
        .map_err(|error| io::Error::other(error.to_string()))?;
    let database_url = args
        .database_url
        .unwrap_or_else(|| settings.database_url().to_owned());

    let applied = run_migrations(&database_url)
        .await
        .map_err(io::Error::other)?;
    if matches!(args.command, Command::Migrate) {
        return report(&format!("applied {} migrations", applied.len()));
    }

    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(2))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;

    match args.command {
        Command::Migrate => Ok(()),
        Command::Setup => {
            let created = labels(&pool)
                .setup_defaults()
                .await
                .map_err(io::Error::other)?;
            report(&format!("created {created} default labels"))
        }
        Command::AddDeveloperUser {
            email,
            first_name,
            last_name,
        } => {
            let users = UserService::new(
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselEventRepository::new(pool)),
                AllowedEmailDomains::default(),
            );
            let (user, created) = users
                .add_developer_user(&email, &first_name, &last_name)
                .await
                .map_err(io::Error::other)?;
            if created {
                report(&format!("created superuser {}", user.email))
            } else {
                report(&format!("user {} already exists", user.email))
            }
        }
        Command::ImportPlacements { file } => {
            let content = read_input(&file)?;
            let report_value = imports(&pool, settings.allowed_email_domains())
                .placements(&content)
                .await
                .map_err(io::Error::other)?;
            report_json(&report_value)
        }
        Command::ImportUsers { file } => {
            let content = read_input(&file)?;
            let report_value = imports(&pool, settings.allowed_email_domains())
                .users(&content)
                .await
                .map_err(io::Error::other)?;
            report_json(&report_value)
        }
        Command::SyncOrganizations {
            file,
            dry_run,
            filter_type,
        } => {
            let content = read_input(&file)?;
            let entries = RegistryEntry::parse_export(&content).map_err(io::Error::other)?;
            let sync = OrganizationSyncService::new(Arc::new(DieselOrganizationRepository::new(
                pool,
            )));
            let result = sync
                .sync(
                    entries,
                    &SyncOptions {
                        dry_run,
                        filter_type,
                    },
                )
                .await
                .map_err(io::Error::other)?;
            report_json(&result)
        }
    }
}

fn labels(pool: &DbPool) -> LabelService {
    let repo = Arc::new(DieselLabelRepository::new(pool.clone()));
    let filters =
        FilterOrderService::new(Arc::new(DieselConfigRepository::new(pool.clone())), repo.clone());
    LabelService::new(repo, filters)
}

fn imports(pool: &DbPool, domains: AllowedEmailDomains) -> ImportService {
    ImportService::new(Arc::new(DieselImportRepository::new(pool.clone())), domains)
}

/// Read a UTF-8 input file, logging its SHA-256 so imports can be traced
/// back to the exact export.
fn read_input(path: &Path) -> io::Result<String> {
    let parent = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "input path must be a file"))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|error| {
        io::Error::other(format!(
            "open input parent directory '{}': {error}",
            parent.display()
        ))
    })?;
    let mut file = directory.open(Path::new(file_name)).map_err(|error| {
        io::Error::other(format!("open input file '{}': {error}", path.display()))
    })?;
    let mut content = String::new();
    file.read_to_string(&mut content).map_err(|error| {
        io::Error::other(format!("read input file '{}': {error}", path.display()))
    })?;
    let digest = hex::encode(Sha256::digest(content.as_bytes()));
    info!(path = %path.display(), sha256 = %digest, "read input file");
    Ok(content)
}

fn report(line: &str) -> io::Result<()> {
    writeln!(io::stdout().lock(), "{line}")
}

fn report_json<T: serde::Serialize>(value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    report(&json)
}
