//! Command line entry point for outreach campaigns

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tokio::signal;

use outreach::{
    services::{SystemClock, WebDriverSession},
    CampaignOrchestrator, Clock, OutreachConfig, RateLedger, Recurrence, Scheduler, Targeting,
};
use shared::{logging, process_debug, process_info, process_warn, CampaignTarget, ProcessId, StrategyKind, TemplateId, TargetingProfile};

/// Rate-limited connection campaigns against a list of companies
#[derive(Parser)]
#[command(name = "outreach")]
#[command(about = "Runs rate-limited connection-request campaigns")]
pub struct Args {
    /// Directory holding campaign_log.json and targeting_profile.json
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Override the profile's daily send target
    #[arg(long, global = true)]
    pub daily_limit: Option<u32>,

    /// Override the profile's weekly send target
    #[arg(long, global = true)]
    pub weekly_limit: Option<u32>,

    /// Contact directory base URL
    #[arg(long, global = true)]
    pub directory_url: Option<String>,

    /// Outreach channel base URL (defaults to the directory URL)
    #[arg(long, global = true)]
    pub channel_url: Option<String>,

    /// WebDriver endpoint for the browser strategy
    #[arg(long, global = true)]
    pub webdriver_url: Option<String>,

    /// Never start a browser; browser-preferred targets go straight to the directory API
    #[arg(long, global = true)]
    pub no_browser: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Send connection requests to people at one company
    Connect {
        company: String,
        #[arg(default_value_t = 20)]
        max: u32,
        #[arg(long, default_value = "browser")]
        strategy: StrategyKind,
        #[arg(long, default_value = "standard")]
        template: TemplateId,
    },
    /// Work through a comma separated list of companies
    Campaign {
        companies: String,
        #[arg(default_value_t = 10)]
        max_per_company: u32,
        #[arg(long, default_value = "browser")]
        strategy: StrategyKind,
        #[arg(long, default_value = "standard")]
        template: TemplateId,
    },
    /// Print today's and this week's counters
    Stats,
    /// Run a campaign on a recurrence until Ctrl+C
    Schedule {
        /// daily, weekly, biweekly or business-days
        recurrence: Recurrence,
        companies: String,
        #[arg(default_value_t = 10)]
        max: u32,
        #[arg(long, default_value = "browser")]
        strategy: StrategyKind,
        #[arg(long, default_value = "standard")]
        template: TemplateId,
    },
    /// Inspect or reset the targeting profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand, Clone, Copy)]
pub enum ProfileAction {
    Show,
    Reset,
}

impl Args {
    /// Environment first, then explicit flags on top
    fn config(&self) -> OutreachConfig {
        let mut config = OutreachConfig::from_env();
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(url) = &self.directory_url {
            config.directory_url = Some(url.clone());
        }
        if let Some(url) = &self.channel_url {
            config.channel_url = Some(url.clone());
        }
        if let Some(url) = &self.webdriver_url {
            config.webdriver_url = Some(url.clone());
        }
        config.daily_limit = self.daily_limit;
        config.weekly_limit = self.weekly_limit;
        config.browser_enabled = !self.no_browser;
        config
    }
}

/// Everything a campaign command needs, plus the browser session to close afterwards
struct Runtime {
    orchestrator: Arc<CampaignOrchestrator>,
    clock: Arc<dyn Clock>,
    session: Option<Arc<WebDriverSession>>,
}

impl Runtime {
    async fn build(config: &OutreachConfig) -> anyhow::Result<Self> {
        let profile = config.profile_store().load().await;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let ledger = open_ledger(config, &profile, clock.clone()).await?;

        let mut orchestrator = CampaignOrchestrator::new(ledger, Targeting::new(profile));
        let mut session = None;
        if let Some((browser, browser_session)) = config.browser_strategy().context("configuring browser strategy")? {
            orchestrator = orchestrator.with_strategy(browser);
            session = Some(browser_session);
        }
        if let Some(directory) = config.directory_strategy().context("configuring directory API strategy")? {
            orchestrator = orchestrator.with_strategy(directory);
        }

        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            clock,
            session,
        })
    }

    fn targets(&self, companies: &str, max: u32, strategy: StrategyKind, template: TemplateId) -> anyhow::Result<Vec<CampaignTarget>> {
        let targeting = self.orchestrator.targeting();
        let targets: Vec<_> = companies
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|company| targeting.target_for(company, max, strategy, template))
            .collect();
        if targets.is_empty() {
            bail!("no companies given");
        }
        Ok(targets)
    }

    async fn close(self) {
        if let Some(session) = self.session {
            if let Err(e) = session.close().await {
                process_warn!(ProcessId::current(), "⚠️ Could not close browser session: {}", e);
            }
        }
    }
}

async fn open_ledger(
    config: &OutreachConfig,
    profile: &TargetingProfile,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<Arc<RateLedger>> {
    let store = Arc::new(config.log_store());
    let ledger = RateLedger::open(store, clock, config.limits(profile))
        .await
        .with_context(|| format!("opening campaign log in {}", config.data_dir.display()))?;
    Ok(Arc::new(ledger))
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let config = args.config();
    process_debug!(ProcessId::current(), "Data directory: {}", config.data_dir.display());

    match args.command {
        Command::Profile { action } => {
            let store = config.profile_store();
            let profile = match action {
                ProfileAction::Show => store.load().await,
                ProfileAction::Reset => {
                    let profile = TargetingProfile::default();
                    store
                        .save(&profile)
                        .await
                        .with_context(|| format!("resetting {}", store.path().display()))?;
                    logging::log_success(ProcessId::current(), "Targeting profile reset to defaults");
                    profile
                }
            };
            println!("{}", serde_json::to_string_pretty(&profile)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Stats => {
            let profile = config.profile_store().load().await;
            let ledger = open_ledger(&config, &profile, Arc::new(SystemClock)).await?;
            let stats = ledger.stats().await.context("reading campaign log")?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Connect {
            company,
            max,
            strategy,
            template,
        } => {
            let runtime = Runtime::build(&config).await?;
            let target = runtime.orchestrator.targeting().target_for(&company, max, strategy, template);
            let outcome = runtime.orchestrator.run_company(&target).await;
            runtime.close().await;

            let outcome = outcome?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(exit_code(!outcome.is_failed()))
        }
        Command::Campaign {
            companies,
            max_per_company,
            strategy,
            template,
        } => {
            let runtime = Runtime::build(&config).await?;
            let targets = runtime.targets(&companies, max_per_company, strategy, template)?;
            let summary = runtime.orchestrator.run_campaign(&targets).await;
            runtime.close().await;

            let summary = summary?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(exit_code(summary.is_success()))
        }
        Command::Schedule {
            recurrence,
            companies,
            max,
            strategy,
            template,
        } => {
            let runtime = Runtime::build(&config).await?;
            let targets = runtime.targets(&companies, max, strategy, template)?;
            let scheduler = Scheduler::new(runtime.orchestrator.clone(), runtime.clock.clone());
            let handle = scheduler.register(recurrence, targets)?;

            logging::log_startup(
                ProcessId::current(),
                &format!("schedule {} ({}), press Ctrl+C to stop", handle.id(), recurrence.describe()),
            );
            signal::ctrl_c().await.context("waiting for Ctrl+C")?;
            logging::log_shutdown(ProcessId::current(), "Received Ctrl+C signal");

            handle.cancel();
            process_info!(ProcessId::current(), "📊 Schedule ran {} times", handle.runs());
            handle.join().await;
            runtime.close().await;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match args.command {
        Command::Schedule { .. } => ProcessId::init_daemon(),
        _ => ProcessId::init_cli(),
    };
    logging::init_tracing_with_level(Some(&args.log_level));

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            logging::log_error(ProcessId::current(), "outreach", &format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
