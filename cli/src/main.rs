use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use sweeper_core::{GameId, OwnerId};
use sweeper_protocol::{MakeMoveRequest, NewGameRequest, TextBoard};
use sweeper_service::{GameService, MemoryStore, OsSeedSource, SeedSequence, SeedSource};

mod render;

type Service = GameService<MemoryStore, Box<dyn SeedSource>>;

const MENU: &str = "Options:
1) Start a new game
2) See running games
3) View my stats
q) Quit";

#[derive(Parser, Debug)]
#[command(version, about = "Play minesweeper in the terminal", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Board width used as the default when starting a game
    #[arg(long, default_value_t = 10)]
    width: i32,

    /// Board height used as the default when starting a game
    #[arg(long, default_value_t = 10)]
    height: i32,

    /// Mine count used as the default, a sixth of the board if not given
    #[arg(long)]
    bombs: Option<i32>,

    /// Force a seed instead of random, consecutive games use consecutive seeds
    #[arg(short, long)]
    seed: Option<u64>,

    /// Owner id the games are stored under
    #[arg(long, default_value_t = 1)]
    owner: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();
    log::debug!("args: {:?}", args);

    let seeds: Box<dyn SeedSource> = match args.seed {
        Some(seed) => Box::new(SeedSequence::new(seed)),
        None => Box::new(OsSeedSource),
    };
    let service = GameService::new(MemoryStore::new(), seeds);
    let mut term = Terminal::new(io::stdin().lock(), io::stdout().lock());

    term.say("--- Minesweeper ---\nCoordinates are 0-indexed.\n")?;
    run(&mut term, &service, &args)
}

fn run<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    service: &Service,
    args: &Args,
) -> Result<()> {
    let owner = OwnerId(args.owner);
    loop {
        term.say(MENU)?;
        let Some(choice) = term.ask("Select an option")? else {
            return Ok(());
        };
        match choice.as_str() {
            "1" => start_new_game(term, service, owner, args)?,
            "2" => resume_game(term, service, owner)?,
            "3" => show_stats(term, service, owner)?,
            "q" | "Q" => {
                term.say("Goodbye!")?;
                return Ok(());
            }
            _ => term.say("Please choose 1, 2, 3 or q.")?,
        }
    }
}

fn start_new_game<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    service: &Service,
    owner: OwnerId,
    args: &Args,
) -> Result<()> {
    let width = term.ask_i32("Board width", args.width)?;
    let height = term.ask_i32("Board height", args.height)?;
    let cells = width.saturating_mul(height).max(1);
    let default_bombs = args.bombs.unwrap_or((cells / 6).max(1));
    let bomb_count = term.ask_i32(&format!("Bomb count (1-{})", cells), default_bombs)?;

    let request = NewGameRequest {
        width,
        height,
        bomb_count,
    };
    match service.new_game(owner, &request) {
        Ok(created) => {
            term.say(&format!(
                "\nStarted game #{} ({}x{}, {} bombs). Enter moves as 'x y'.",
                created.id, width, height, bomb_count
            ))?;
            play_game(term, service, owner, created.id, created.board)
        }
        Err(err) => term.say(&format!("Cannot create game: {}", err.public_message())),
    }
}

fn resume_game<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    service: &Service,
    owner: OwnerId,
) -> Result<()> {
    let games = service
        .unfinished_games(owner)
        .context("Failed to fetch unfinished games")?;
    if games.is_empty() {
        return term.say("No unfinished games found.");
    }

    term.say("\nUnfinished games:")?;
    for (idx, game) in games.iter().enumerate() {
        let width = game.board.first().map_or(0, Vec::len);
        term.say(&format!(
            "{}) Game #{} - {}x{} board, moves: {}, updated: {}",
            idx + 1,
            game.id,
            width,
            game.board.len(),
            game.moves_count,
            game.updated_at
        ))?;
    }

    let selection = loop {
        let choice = term.ask_i32("Select a game by number", 1)?;
        match usize::try_from(choice) {
            Ok(choice) if (1..=games.len()).contains(&choice) => break choice - 1,
            _ => term.say(&format!("Please choose a number between 1 and {}.", games.len()))?,
        }
    };

    let game = &games[selection];
    term.say(&format!("\nResumed game #{}. Enter moves as 'x y'.", game.id))?;
    play_game(term, service, owner, game.id, game.board.clone())
}

fn show_stats<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    service: &Service,
    owner: OwnerId,
) -> Result<()> {
    let stats = service.stats(owner).context("Failed to load stats")?;
    term.say(&format!(
        "\nPlayed: {} | Won: {} | Lost: {} | Avg moves: {:.2}\n",
        stats.games_played, stats.games_won, stats.games_lost, stats.average_moves
    ))
}

fn play_game<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    service: &Service,
    owner: OwnerId,
    game_id: u64,
    mut board: TextBoard,
) -> Result<()> {
    loop {
        term.say(&format!("\n{}", render::render(&board)))?;
        let Some(input) = term.ask("Move (x y) or 'q' to return to menu")? else {
            return Ok(());
        };
        if input.eq_ignore_ascii_case("q") {
            return term.say("Returning to menu.");
        }

        let Some((x, y)) = parse_move(&input) else {
            term.say("Enter a move as two numbers: x y")?;
            continue;
        };

        let response = match service.make_move(owner, &MakeMoveRequest { game_id, x, y }) {
            Ok(response) => response,
            Err(err) => {
                term.say(&format!("Move failed: {}", err.public_message()))?;
                continue;
            }
        };
        board = response.board;

        if let Some(won) = response.result {
            term.say(&render::render(&board))?;
            term.say(if won {
                "You win! Board cleared."
            } else {
                "Boom! You hit a bomb."
            })?;
            log::debug!("{:?}", service.game(owner, GameId(game_id)));
            return term.say(&format!("Game #{} finished.\n", game_id));
        }
    }
}

fn parse_move(input: &str) -> Option<(i32, i32)> {
    let mut parts = input.split_whitespace();
    let x: i32 = parts.next()?.parse().ok()?;
    let y: i32 = parts.next()?.parse().ok()?;
    parts.next().is_none().then_some((x, y))
}

/// Line-oriented prompt over any reader/writer pair.
struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text).context("Failed to write to terminal")
    }

    /// `None` once input is exhausted.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}: ", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read from terminal")?;
        Ok((read > 0).then(|| line.trim().to_string()))
    }

    fn ask_i32(&mut self, prompt: &str, default: i32) -> Result<i32> {
        loop {
            let Some(input) = self.ask(&format!("{} [{}]", prompt, default))? else {
                return Ok(default);
            };
            if input.is_empty() {
                return Ok(default);
            }
            match input.parse() {
                Ok(value) => return Ok(value),
                Err(_) => self.say("Please enter a valid number.")?,
            }
        }
    }
}
