mod api;
mod cli;
mod config;
mod controller;
mod form;
mod macros;
mod model;
mod state;
mod terminal;
mod view;

use std::{error::Error, path::PathBuf};

use anyhow::anyhow;
use api::HttpBackend;
use clap::Parser;
use config::Config;
use controller::{Controller, Outcome};
use form::{FormSnapshot, MissingFields, ReasonSnapshot};
use log::{debug, info};
use state::{Session, State};
use terminal::TerminalView;

type Panel = Controller<HttpBackend, TerminalView>;

#[derive(Parser)]
#[command(name = env!("CARGO_BIN_NAME"))]
#[command(bin_name = env!("CARGO_BIN_NAME"))]
enum Cli {
    #[command(about = "Prints tool version")]
    #[command(long_about = None)]
    Version,

    #[command(about = "Shows the document list")]
    #[command(long_about = None)]
    Documents(CommonArgs),

    #[command(about = "Shows a fiscal document by its number")]
    #[command(long_about = None)]
    Document(DocumentArgs),

    #[command(about = "Shows the service settings")]
    #[command(long_about = None)]
    Settings(CommonArgs),

    #[command(about = "Shows the management panel")]
    #[command(long_about = None)]
    Management(CommonArgs),

    #[command(about = "Shows the registration form")]
    #[command(long_about = None)]
    RegisterForm(CommonArgs),

    #[command(about = "Shows the registration layout")]
    #[command(long_about = None)]
    RegisterLayout(CommonArgs),

    #[command(about = "Shows the re-registration layout")]
    #[command(long_about = None)]
    ReRegisterLayout(CommonArgs),

    #[command(about = "Opens a session on the fiscal device")]
    #[command(long_about = None)]
    Open(CommonArgs),

    #[command(about = "Closes the session on the fiscal device")]
    #[command(long_about = None)]
    Close(CommonArgs),

    #[command(about = "Closes the fiscal storage archive")]
    #[command(long_about = None)]
    CloseArchive(CommonArgs),

    #[command(about = "Shows the backend status of the fiscal device")]
    #[command(long_about = None)]
    Status(CommonArgs),

    #[command(about = "Registers the fiscal device")]
    #[command(long_about = None)]
    Register(FormArgs),

    #[command(about = "Re-registers the fiscal device")]
    #[command(long_about = None)]
    ReRegister(FormArgs),

    #[command(about = "Saves the FRWS session cookie")]
    #[command(long_about = None)]
    Login(LoginArgs),

    #[command(about = "Forgets the saved FRWS session")]
    #[command(long_about = None)]
    Logout(CommonArgs),
}

#[derive(clap::Args)]
struct CommonArgs {
    #[arg(short='c', long, default_value=Some("./config.toml"))]
    config_path: PathBuf,
}

#[derive(clap::Args)]
struct DocumentArgs {
    #[command(flatten)]
    common: CommonArgs,

    #[arg()]
    id: Option<String>,
}

#[derive(clap::Args)]
struct FormArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Send the form preset from the config without prompting.
    #[arg(long)]
    no_input: bool,
}

#[derive(clap::Args)]
struct LoginArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Cookie value; prompted for when omitted.
    #[arg(long)]
    cookie: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    match Cli::parse() {
        Cli::Version => {
            println!(env!("CARGO_PKG_VERSION"));
        }
        Cli::Documents(args) => run(&args, |p| p.load_document_list())?,
        Cli::Document(args) => run(&args.common, |p| p.load_document_by_id(args.id.as_deref()))?,
        Cli::Settings(args) => run(&args, |p| p.load_settings())?,
        Cli::Management(args) => run(&args, |p| p.load_management())?,
        Cli::RegisterForm(args) => run(&args, |p| p.load_register_form())?,
        Cli::RegisterLayout(args) => run(&args, |p| p.load_register_layout())?,
        Cli::ReRegisterLayout(args) => run(&args, |p| p.load_re_register_layout())?,
        Cli::Open(args) => run(&args, |p| p.open_device())?,
        Cli::Close(args) => run(&args, |p| p.close_device())?,
        Cli::CloseArchive(args) => run(&args, |p| p.close_archive())?,
        Cli::Status(args) => run(&args, |p| p.fetch_status())?,
        Cli::Register(args) => {
            let mut app = App::load(&args.common)?;

            let form = read_form(&app.cfg.form, args.no_input)?;

            let outcome = app.panel.submit_registration(&form)?;
            app.finish(outcome)?;
        }
        Cli::ReRegister(args) => {
            let mut app = App::load(&args.common)?;

            let form = read_form(&app.cfg.form, args.no_input)?;
            let reasons = read_reasons(&app.cfg.reasons, args.no_input)?;

            let outcome = app.panel.submit_re_registration(&form, &reasons)?;
            app.finish(outcome)?;
        }
        Cli::Login(args) => login(args)?,
        Cli::Logout(args) => logout(&args)?,
    };

    Ok(())
}

/// Всё, что нужно для одного действия в панели управления.
struct App {
    cfg: Config,
    state: State,
    panel: Panel,
}

impl App {
    fn load(args: &CommonArgs) -> anyhow::Result<Self> {
        let (cfg, state) = load_config_and_state(args)?;

        let cookie = state.session.as_ref().map(|s| {
            debug!("Используем сессию, сохранённую {}", s.saved_at());
            s.cookie(&cfg.session_cookie)
        });

        let backend = HttpBackend::new(cfg.base_url.clone(), cfg.timeout(), cookie)?;
        let panel = Controller::new(backend, TerminalView::new(cfg.base_url.clone()));

        Ok(Self { cfg, state, panel })
    }

    fn finish(mut self, outcome: Outcome) -> anyhow::Result<()> {
        match outcome {
            Outcome::Rendered => Ok(()),
            Outcome::Skipped => {
                info!("Запрос не отправлен");
                Ok(())
            }
            Outcome::Redirected => {
                debug!("Забываем сессию в {:?}", self.cfg.state_path);
                self.state.session = None;
                state::save(&self.state, &self.cfg.state_path)?;

                Err(anyhow!("authentication required"))
            }
            Outcome::Invalid(fields) => Err(MissingFields(fields).into()),
        }
    }
}

fn run<F>(args: &CommonArgs, action: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut Panel) -> controller::Result,
{
    let mut app = App::load(args)?;

    let outcome = action(&mut app.panel)?;

    app.finish(outcome)
}

fn load_config_and_state(args: &CommonArgs) -> anyhow::Result<(Config, State)> {
    debug!("Подгружаем конфиг из {:?}", args.config_path);
    let cfg = config::load(args.config_path.clone())?;

    debug!("Подгружаем состояние из {:?}", cfg.state_path);
    let state = state::load(&cfg.state_path)?;

    Ok((cfg, state))
}

fn read_form(preset: &FormSnapshot, no_input: bool) -> anyhow::Result<FormSnapshot> {
    if no_input {
        return Ok(preset.clone());
    }
    cli::ask_form(preset)
}

fn read_reasons(preset: &ReasonSnapshot, no_input: bool) -> anyhow::Result<ReasonSnapshot> {
    if no_input {
        return Ok(*preset);
    }
    cli::ask_reasons(preset)
}

fn login(args: LoginArgs) -> anyhow::Result<()> {
    let (cfg, mut state) = load_config_and_state(&args.common)?;

    let value = match args.cookie {
        Some(c) => c,
        None => cli::ask_session()?,
    };

    state.session = Some(Session::new(value)?);

    debug!("Сохраняем состояние в {:?}", cfg.state_path);
    state::save(&state, &cfg.state_path)?;

    println!("Сессия сохранена");

    Ok(())
}

fn logout(args: &CommonArgs) -> anyhow::Result<()> {
    let (cfg, mut state) = load_config_and_state(args)?;

    state.session = None;

    debug!("Сохраняем состояние в {:?}", cfg.state_path);
    state::save(&state, &cfg.state_path)?;

    println!("Сессия удалена");

    Ok(())
}
