use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::{ApiClient, ConsoleConfig, EventDesk, FixtureBackend, RegistryBackend};
use registry::dto::player::UpdatePlayerRequest;
use registry::dto::race::{UpdateMaxRacesRequest, UpdateRowMaxRacesRequest};
use registry::dto::results::{ScoreEntryRequest, StatusUpdateRequest};
use registry::models::{MatrixKey, ParticipantStatus, Player, Schedule, SkateCategory};
use registry::services::standings;
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "club-console")]
#[command(about = "Club registration and event-official console", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "API_BASE_URL")]
    api_url: Option<String>,

    #[arg(long, env = "API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long, env = "API_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Use a JSON fixture snapshot instead of the API; edits are written back to it
    #[arg(long)]
    fixtures: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    Players {
        #[command(subcommand)]
        command: PlayerCommands,
    },
    Clubs,
    Events,
    Matrix {
        #[command(subcommand)]
        command: MatrixCommands,
    },
    Races {
        #[command(subcommand)]
        command: RemoveCommand,
    },
    AgeGroups {
        #[command(subcommand)]
        command: RemoveCommand,
    },
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommands,
    },
    Results {
        #[command(subcommand)]
        command: ResultsCommands,
    },
    /// Medal table per club for an event
    Tally {
        #[arg(long)]
        event: Uuid,
    },
}

#[derive(Subcommand)]
enum PlayerCommands {
    List {
        #[arg(long)]
        search: Option<String>,

        /// Only players awaiting approval
        #[arg(long)]
        pending: bool,
    },
    Approve {
        id: Uuid,
    },
}

#[derive(clap::Args)]
struct CellArgs {
    #[arg(long)]
    event: Uuid,

    #[arg(long)]
    race: Uuid,

    #[arg(long)]
    age_group: Uuid,

    #[arg(long)]
    category: SkateCategory,
}

impl CellArgs {
    fn key(&self) -> MatrixKey {
        MatrixKey::new(self.race, self.age_group, self.category)
    }
}

#[derive(Subcommand)]
enum MatrixCommands {
    Show {
        #[arg(long)]
        event: Uuid,
    },
    Toggle {
        #[command(flatten)]
        cell: CellArgs,
    },
    SetMax {
        #[command(flatten)]
        cell: CellArgs,

        value: u32,
    },
    /// Apply one cap to every race of an age group/category row
    SetRowMax {
        #[arg(long)]
        event: Uuid,

        #[arg(long)]
        age_group: Uuid,

        #[arg(long)]
        category: SkateCategory,

        value: u32,
    },
}

#[derive(Subcommand)]
enum RemoveCommand {
    /// Delete the entity and every race matrix cell of the event that uses it
    Remove {
        id: Uuid,

        #[arg(long)]
        event: Uuid,
    },
}

#[derive(Subcommand)]
enum ScheduleCommands {
    Eligible {
        #[arg(long)]
        event: Uuid,

        #[arg(long)]
        schedule: Uuid,

        #[arg(long)]
        search: Option<String>,
    },
    Plan {
        #[command(flatten)]
        cell: CellArgs,

        #[arg(long, default_value_t = 8)]
        heat_size: usize,
    },
}

#[derive(Subcommand)]
enum ResultsCommands {
    Show {
        #[arg(long)]
        event: Uuid,

        #[arg(long)]
        schedule: Uuid,
    },
    /// Set one round score; omit the score to clear it
    Score {
        #[arg(long)]
        event: Uuid,

        #[arg(long)]
        schedule: Uuid,

        #[arg(long)]
        player: Uuid,

        #[arg(long)]
        round: usize,

        score: Option<Decimal>,
    },
    Status {
        #[arg(long)]
        event: Uuid,

        #[arg(long)]
        schedule: Uuid,

        #[arg(long)]
        player: Uuid,

        status: ParticipantStatus,
    },
    /// Recalculate ranks and medals and mark the heat's results as entered
    Rank {
        #[arg(long)]
        event: Uuid,

        #[arg(long)]
        schedule: Uuid,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "club_console={},console={},registry={}",
                    log_level, log_level, log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let backend = open_backend(&cli).await?;
    tracing::debug!("Using {} backend", backend.name());

    match cli.command {
        Commands::Players { command } => handle_players(backend, command).await?,
        Commands::Clubs => list_clubs(backend).await?,
        Commands::Events => list_events(backend).await?,
        Commands::Matrix { command } => handle_matrix(backend, command).await?,
        Commands::Races {
            command: RemoveCommand::Remove { id, event },
        } => {
            let mut desk = EventDesk::load(backend.clone(), event).await?;
            let dropped = desk.remove_race(id).await?;
            backend.flush().await?;
            println!("Removed race {} and {} matrix cells", id, dropped);
        }
        Commands::AgeGroups {
            command: RemoveCommand::Remove { id, event },
        } => {
            let mut desk = EventDesk::load(backend.clone(), event).await?;
            let dropped = desk.remove_age_group(id).await?;
            backend.flush().await?;
            println!("Removed age group {} and {} matrix cells", id, dropped);
        }
        Commands::Schedule { command } => handle_schedule(backend, command).await?,
        Commands::Results { command } => handle_results(backend, command).await?,
        Commands::Tally { event } => {
            let desk = EventDesk::load(backend, event).await?;
            println!("{:<32} {:>5} {:>7} {:>7} {:>6}", "CLUB", "GOLD", "SILVER", "BRONZE", "TOTAL");
            for row in desk.medal_tally() {
                println!(
                    "{:<32} {:>5} {:>7} {:>7} {:>6}",
                    row.club_name,
                    row.gold,
                    row.silver,
                    row.bronze,
                    row.total()
                );
            }
        }
    }

    Ok(())
}

async fn open_backend(cli: &Cli) -> anyhow::Result<Arc<dyn RegistryBackend>> {
    if let Some(ref path) = cli.fixtures {
        let backend = FixtureBackend::load(path)
            .await
            .with_context(|| format!("Failed to load fixtures from {}", path.display()))?;
        return Ok(Arc::new(backend));
    }

    let api_url = cli
        .api_url
        .clone()
        .context("Either --api-url (API_BASE_URL) or --fixtures is required")?;

    let mut config = ConsoleConfig::new(api_url)
        .context("Failed to load API configuration")?
        .with_token(cli.token.clone());
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    tracing::info!("Using API at {}", config.api_base_url);
    let client = ApiClient::new(&config).context("Failed to build HTTP client")?;
    Ok(Arc::new(client))
}

async fn handle_players(
    backend: Arc<dyn RegistryBackend>,
    command: PlayerCommands,
) -> anyhow::Result<()> {
    match command {
        PlayerCommands::List { search, pending } => {
            let players = backend.list_players().await?;
            let clubs = backend.list_clubs().await?;
            let query = search.as_deref().map(str::to_lowercase);

            println!(
                "{:<36}  {:<28} {:<10} {:<8} {:<9} CLUB",
                "ID", "NAME", "BORN", "GENDER", "CATEGORY"
            );
            for player in players
                .iter()
                .filter(|p| !pending || !p.approved)
                .filter(|p| {
                    query
                        .as_ref()
                        .is_none_or(|q| p.full_name().to_lowercase().contains(q))
                })
            {
                let club = player
                    .club_id
                    .and_then(|id| clubs.iter().find(|c| c.id == id))
                    .map(|c| c.name.as_str())
                    .unwrap_or("-");
                let born = player
                    .date_of_birth
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "unknown".to_string());

                println!(
                    "{:<36}  {:<28} {:<10} {:<8} {:<9} {}{}",
                    player.id,
                    player.full_name(),
                    born,
                    player.gender,
                    player.category,
                    club,
                    if player.approved { "" } else { " (pending)" }
                );
            }
        }
        PlayerCommands::Approve { id } => {
            let player = backend
                .update_player(id, &UpdatePlayerRequest::approve())
                .await?;
            backend.flush().await?;
            println!("Approved {}", player.full_name());
        }
    }

    Ok(())
}

async fn list_clubs(backend: Arc<dyn RegistryBackend>) -> anyhow::Result<()> {
    let clubs = backend.list_clubs().await?;
    let districts = backend.list_districts().await?;
    let states = backend.list_states().await?;

    println!("{:<36}  {:<32} DISTRICT", "ID", "NAME");
    for club in clubs {
        let district = club
            .district_id
            .and_then(|id| districts.iter().find(|d| d.id == id));
        let location = match district {
            Some(d) => match states.iter().find(|s| s.id == d.state_id) {
                Some(state) => format!("{} ({})", d.name, state.code),
                None => d.name.clone(),
            },
            None => "-".to_string(),
        };

        println!("{:<36}  {:<32} {}", club.id, club.name, location);
    }

    Ok(())
}

async fn list_events(backend: Arc<dyn RegistryBackend>) -> anyhow::Result<()> {
    println!("{:<36}  {:<32} {:<10} {:<10} AGES AS ON", "ID", "NAME", "START", "END");
    for event in backend.list_events().await? {
        println!(
            "{:<36}  {:<32} {:<10} {:<10} {}",
            event.id,
            event.name,
            event.start_date,
            event.end_date,
            event.age_reference_date()
        );
    }

    Ok(())
}

async fn handle_matrix(
    backend: Arc<dyn RegistryBackend>,
    command: MatrixCommands,
) -> anyhow::Result<()> {
    match command {
        MatrixCommands::Show { event } => {
            let desk = EventDesk::load(backend, event).await?;
            print_matrix(&desk);
        }
        MatrixCommands::Toggle { cell } => {
            let mut desk = EventDesk::load(backend.clone(), cell.event).await?;
            let open = desk.toggle_race(cell.race, cell.age_group, cell.category)?;
            desk.save_matrix().await?;
            backend.flush().await?;
            println!("Cell is now {}", if open { "open" } else { "closed" });
        }
        MatrixCommands::SetMax { cell, value } => {
            let mut desk = EventDesk::load(backend.clone(), cell.event).await?;
            let request = UpdateMaxRacesRequest {
                race_id: cell.race,
                age_group_id: cell.age_group,
                category: cell.category,
                max_races_per_player: value,
            };
            if !desk.set_max_races(&request)? {
                anyhow::bail!("Cell {:?} is not in the race matrix", cell.key());
            }
            desk.save_matrix().await?;
            backend.flush().await?;
            println!("Max races per player set to {}", value);
        }
        MatrixCommands::SetRowMax {
            event,
            age_group,
            category,
            value,
        } => {
            let mut desk = EventDesk::load(backend.clone(), event).await?;
            let updated = desk.set_row_max_races(&UpdateRowMaxRacesRequest {
                age_group_id: age_group,
                category,
                max_races_per_player: value,
            })?;
            desk.save_matrix().await?;
            backend.flush().await?;
            println!("Max races per player set to {} on {} cells", value, updated);
        }
    }

    Ok(())
}

fn print_matrix(desk: &EventDesk) {
    println!(
        "{:<24} {:<16} {:<9} {:<8} MAX RACES",
        "RACE", "AGE GROUP", "CATEGORY", "ENABLED"
    );
    for entry in desk.matrix().entries() {
        let race = desk
            .race(entry.race_id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|_| entry.race_id.to_string());
        let group = desk
            .age_group(entry.age_group_id)
            .map(|g| g.name.clone())
            .unwrap_or_else(|_| entry.age_group_id.to_string());

        println!(
            "{:<24} {:<16} {:<9} {:<8} {}",
            race,
            group,
            entry.category,
            if entry.is_enabled { "yes" } else { "no" },
            entry.max_races_per_player
        );
    }
}

async fn handle_schedule(
    backend: Arc<dyn RegistryBackend>,
    command: ScheduleCommands,
) -> anyhow::Result<()> {
    match command {
        ScheduleCommands::Eligible {
            event,
            schedule,
            search,
        } => {
            let desk = EventDesk::load(backend, event).await?;
            let eligible = desk.eligible_for_schedule(schedule, search.as_deref())?;

            if eligible.is_empty() {
                println!("No eligible players found");
                return Ok(());
            }

            let as_of = desk.as_of();
            for player in eligible {
                println!(
                    "{:<36}  {:<28} age {}",
                    player.id,
                    player.full_name(),
                    player.age_on(as_of).unwrap_or_default()
                );
            }
        }
        ScheduleCommands::Plan { cell, heat_size } => {
            let mut desk = EventDesk::load(backend.clone(), cell.event).await?;
            let heats = desk.schedule_heats(cell.key(), heat_size).await?;
            backend.flush().await?;

            for heat in &heats {
                println!(
                    "Heat {} ({}): {} players",
                    heat.heat,
                    heat.id,
                    heat.players.len()
                );
            }
        }
    }

    Ok(())
}

async fn handle_results(
    backend: Arc<dyn RegistryBackend>,
    command: ResultsCommands,
) -> anyhow::Result<()> {
    match command {
        ResultsCommands::Show { event, schedule } => {
            let desk = EventDesk::load(backend, event).await?;
            print_results(desk.schedule(schedule)?, desk.players());
        }
        ResultsCommands::Score {
            event,
            schedule,
            player,
            round,
            score,
        } => {
            let mut desk = EventDesk::load(backend.clone(), event).await?;
            let request = ScoreEntryRequest {
                player_id: player,
                round,
                score,
            };
            desk.enter_score(schedule, &request)?;
            desk.save_schedule(schedule).await?;
            backend.flush().await?;
            print_results(desk.schedule(schedule)?, desk.players());
        }
        ResultsCommands::Status {
            event,
            schedule,
            player,
            status,
        } => {
            let mut desk = EventDesk::load(backend.clone(), event).await?;
            desk.set_status(
                schedule,
                &StatusUpdateRequest {
                    player_id: player,
                    status,
                },
            )?;
            desk.save_schedule(schedule).await?;
            backend.flush().await?;
            print_results(desk.schedule(schedule)?, desk.players());
        }
        ResultsCommands::Rank { event, schedule } => {
            let mut desk = EventDesk::load(backend.clone(), event).await?;
            desk.calculate_ranks(schedule)?;
            desk.save_results(schedule).await?;
            backend.flush().await?;
            print_results(desk.schedule(schedule)?, desk.players());
        }
    }

    Ok(())
}

fn print_results(schedule: &Schedule, players: &[Player]) {
    println!(
        "Heat {}{}",
        schedule.heat,
        if schedule.results_entered {
            " (results entered)"
        } else {
            ""
        }
    );
    println!(
        "{:>4}  {:<28} {:<40} {:>8} {:<9} MEDAL",
        "RANK", "NAME", "ROUNDS", "AVERAGE", "STATUS"
    );

    for participant in standings(&schedule.players) {
        let name = players
            .iter()
            .find(|p| p.id == participant.player_id)
            .map(Player::full_name)
            .unwrap_or_else(|| participant.player_id.to_string());
        let rounds = participant
            .rounds
            .iter()
            .map(|r| r.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()))
            .collect::<Vec<_>>()
            .join(" ");
        let rank = if participant.rank == 0 {
            "-".to_string()
        } else {
            participant.rank.to_string()
        };

        println!(
            "{:>4}  {:<28} {:<40} {:>8} {:<9} {}",
            rank,
            name,
            rounds,
            participant.total_score.round_dp(2),
            participant.status,
            participant.medal.map(|m| m.as_str()).unwrap_or("")
        );
    }
}
