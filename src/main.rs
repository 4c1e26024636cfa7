use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use ludo::{
    engine::{Difficulty, choose_move},
    flavor::{CannedFlavor, FlavorText, flavor_or_fallback},
    ludo::{
        COMMON_TRACK, Cell, Color, GameConfig, GameSession, Location, PieceId, Position,
        Presentation, RandomDice, RollOutcome, TracePresentation, yard_origin,
    },
    simulate::run_batch,
};
use nannou::{
    color::{self, Srgb},
    geom::Rect,
    prelude::Key,
};
use rand::{SeedableRng, rngs::StdRng};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Ludo against computer players
#[derive(Parser, Debug, Clone)]
#[command(name = "ludo")]
#[command(about = "Ludo with heuristic computer players", long_about = None)]
struct Args {
    /// Number of colors in the game (2, 3 or 4)
    #[arg(long, default_value_t = 4)]
    players: u8,

    /// Strength of the computer players
    #[arg(long, default_value_t = Difficulty::Hard)]
    difficulty: Difficulty,

    /// Color played from the keyboard. Without it the computer plays every color.
    #[arg(long)]
    human: Option<Color>,

    /// Seconds the human may idle before the turn is passed. 0 disables the clock.
    #[arg(long, default_value_t = 30)]
    turn_seconds: u64,

    /// Seed for dice and computer players
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Play computer-only games in parallel and print statistics
    Simulate {
        /// Number of games
        #[arg(long, default_value_t = 1000)]
        games: u32,

        /// One difficulty per color in turn order, e.g. hard,easy,easy,easy
        #[arg(long, value_delimiter = ',')]
        tiers: Vec<Difficulty>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = GameConfig::for_players(args.players)?;
    if let Some(human) = args.human {
        if !config.rotation.contains(&human) {
            return Err(format!("{} is not playing with {} players", human, args.players).into());
        }
    }

    match args.command {
        Some(Command::Simulate { games, tiers }) => {
            let tiers = if tiers.is_empty() {
                vec![args.difficulty; config.player_count()]
            } else {
                tiers
            };
            let seed = args.seed.unwrap_or_else(rand::random);
            info!(games, ?tiers, seed, "simulating");
            let start = Instant::now();
            let stats = run_batch(&config, &tiers, games, seed)?;
            println!("{}", stats);
            println!("Simulation took: {:?}", start.elapsed());
        }
        None => nannou::app(model).update(update).run(),
    }
    Ok(())
}

/// Frames to wait after a roll before the computer moves.
const ROLL_PAUSE_FRAMES: u8 = 30;
/// Frames to wait after a move, while the piece is shown in its new place.
const MOVE_PAUSE_FRAMES: u8 = 20;
const LOG_LINES: usize = 10;

struct Model {
    session: GameSession,
    difficulty: Difficulty,
    human: Option<Color>,
    turn_clock: Option<Duration>,
    rng: StdRng,
    feed: Feed,
    state: State,
    message: String,
}

enum State {
    /// Next action may run.
    Ready,
    /// Playback in progress. Input is blocked until it counts down.
    Playback(u8),
}

/// Collects session notifications for the side panel.
struct Feed {
    trace: TracePresentation,
    flavor: Option<Box<dyn FlavorText>>,
    commentary: String,
    log: Vec<String>,
    last_move: Option<(PieceId, Location, Location)>,
    /// Last rolled value. The session forgets it once the move is played.
    last_die: Option<u8>,
    last_activity: Instant,
    pause_frames: u8,
}

impl Feed {
    fn push(&mut self, line: String) {
        self.log.push(line);
        if self.log.len() > LOG_LINES {
            self.log.remove(0);
        }
        self.last_activity = Instant::now();
    }

    fn die_text(&self) -> String {
        self.last_die.map_or_else(|| "-".to_string(), |die| die.to_string())
    }
}

impl Presentation for Feed {
    fn on_rolled(&mut self, color: Color, die: u8) {
        self.trace.on_rolled(color, die);
        self.last_die = Some(die);
        self.commentary = flavor_or_fallback(self.flavor.as_deref_mut(), color, die);
        self.push(format!("{} rolled {}", color, die));
        self.pause_frames = self.pause_frames.max(ROLL_PAUSE_FRAMES);
    }

    fn on_piece_moved(&mut self, piece: PieceId, from: Location, to: Location) {
        self.trace.on_piece_moved(piece, from, to);
        self.last_move = Some((piece, from, to));
        self.push(format!("{} moved to {}", piece, to));
        self.pause_frames = self.pause_frames.max(MOVE_PAUSE_FRAMES);
    }

    fn on_piece_captured(&mut self, piece: PieceId, yard: Location) {
        self.trace.on_piece_captured(piece, yard);
        self.push(format!("{} was captured", piece));
    }

    fn on_piece_finished(&mut self, piece: PieceId) {
        self.trace.on_piece_finished(piece);
        self.push(format!("{} reached home", piece));
    }

    fn on_turn_changed(&mut self, color: Color) {
        self.trace.on_turn_changed(color);
        self.push(format!("{}'s turn", color));
    }

    fn on_game_ended(&mut self, placements: &[Color]) {
        self.trace.on_game_ended(placements);
        let names: Vec<&str> = placements.iter().map(|c| c.name()).collect();
        self.push(format!("Game over: {}", names.join(", ")));
    }
}

fn model(app: &nannou::App) -> Model {
    app.new_window()
        .size(1120, 780)
        .title("Ludo")
        .view(view)
        .key_pressed(key_pressed)
        .build()
        .unwrap();

    let args = Args::parse();
    let config = GameConfig::for_players(args.players).unwrap_or_default();
    let (dice, rng) = match args.seed {
        Some(seed) => (RandomDice::seeded(seed), StdRng::seed_from_u64(seed.wrapping_add(1))),
        None => (RandomDice::from_entropy(), StdRng::from_os_rng()),
    };
    let session = GameSession::new(config, dice).expect("standard board geometry is valid");
    let flavor: Box<dyn FlavorText> = match args.seed {
        Some(seed) => Box::new(CannedFlavor::seeded(seed)),
        None => Box::new(CannedFlavor::new()),
    };

    let mut model = Model {
        session,
        difficulty: args.difficulty,
        human: args.human,
        turn_clock: (args.turn_seconds > 0).then(|| Duration::from_secs(args.turn_seconds)),
        rng,
        feed: Feed {
            trace: TracePresentation,
            flavor: Some(flavor),
            commentary: String::new(),
            log: Vec::new(),
            last_move: None,
            last_die: None,
            last_activity: Instant::now(),
            pause_frames: 0,
        },
        state: State::Ready,
        message: String::new(),
    };
    model.flush_events();
    model
}

impl Model {
    fn flush_events(&mut self) {
        self.session.dispatch_events(&mut self.feed);
        if self.feed.pause_frames > 0 {
            self.state = State::Playback(self.feed.pause_frames);
            self.feed.pause_frames = 0;
        }
    }

    fn human_to_move(&self) -> bool {
        self.human == Some(self.session.current_turn())
    }

    /// One step of a computer turn: roll, or pick a piece for a pending roll.
    fn computer_step(&mut self) {
        let color = self.session.current_turn();
        let die = self.session.die();
        let result = if die == 0 {
            self.session.roll(color).map(|_| ())
        } else {
            let legal = self.session.legal_moves().to_vec();
            match choose_move(self.session.board(), &legal, die, self.difficulty, &mut self.rng) {
                Some(piece) => self.session.apply_move(piece).map(|_| ()),
                None => self.session.force_end_turn(),
            }
        };
        if let Err(rejection) = result {
            warn!(%rejection, %color, "computer action rejected");
        }
    }
}

fn update(_app: &nannou::App, model: &mut Model, _update: nannou::event::Update) {
    match model.state {
        State::Playback(0) => model.state = State::Ready,
        State::Playback(n) => {
            model.state = State::Playback(n - 1);
            return;
        }
        State::Ready => {}
    }

    if model.session.is_over() {
        return;
    }

    if model.human_to_move() {
        let idle = model.feed.last_activity.elapsed();
        if model.turn_clock.is_some_and(|limit| idle > limit) {
            if let Err(rejection) = model.session.force_end_turn() {
                warn!(%rejection, "turn clock");
            }
            model.message = "Time is up, turn passed".to_string();
        }
    } else {
        model.computer_step();
    }
    model.flush_events();
}

fn key_pressed(_app: &nannou::App, model: &mut Model, key: Key) {
    if let State::Playback(_) = model.state {
        return;
    }
    if model.session.is_over() || !model.human_to_move() {
        return;
    }
    let color = model.session.current_turn();

    let result = match key {
        Key::Space if model.session.die() == 0 => model.session.roll(color).map(|outcome| match outcome {
            RollOutcome::AwaitingSelection { .. } => "Pick a piece with 1-4".to_string(),
            RollOutcome::NoLegalMoves { die } => format!("No move with a {}", die),
            RollOutcome::Forfeited { .. } => "Third six, turn forfeited".to_string(),
            RollOutcome::AutoMoved(outcome) => format!("{} moved", outcome.piece),
        }),
        Key::Space | Key::Return => model.session.commit().map(|outcome| format!("{} moved", outcome.piece)),
        Key::Key1 | Key::Key2 | Key::Key3 | Key::Key4 => {
            let slot = match key {
                Key::Key1 => 1,
                Key::Key2 => 2,
                Key::Key3 => 3,
                _ => 4,
            };
            let piece = PieceId::new(color, slot);
            model.session.select(piece).map(|_| format!("{} selected, Enter to move", piece))
        }
        Key::Escape | Key::Back => model.session.deselect().map(|piece| format!("{} deselected", piece)),
        _ => return,
    };

    model.message = match result {
        Ok(message) => message,
        Err(rejection) => rejection.to_string(),
    };
    model.flush_events();
}

fn strong(color: Color) -> Srgb<u8> {
    match color {
        Color::Red => color::CRIMSON,
        Color::Green => color::FORESTGREEN,
        Color::Yellow => color::GOLD,
        Color::Blue => color::ROYALBLUE,
    }
}

fn light(color: Color) -> Srgb<u8> {
    match color {
        Color::Red => color::LIGHTCORAL,
        Color::Green => color::LIGHTGREEN,
        Color::Yellow => color::LIGHTYELLOW,
        Color::Blue => color::LIGHTBLUE,
    }
}

/// Center of a grid cell in window coordinates.
fn cell_center(grid: &Rect, size: f32, cell: Cell) -> (f32, f32) {
    (
        grid.left() + (cell.col as f32 - 0.5) * size,
        grid.top() - (cell.row as f32 - 0.5) * size,
    )
}

/// Where a piece at home waits inside its yard.
fn yard_slot(piece: PieceId) -> Cell {
    let origin = yard_origin(piece.color());
    let (dr, dc) = match piece.slot() {
        1 => (1, 1),
        2 => (1, 4),
        3 => (4, 1),
        _ => (4, 4),
    };
    Cell::new(origin.row + dr, origin.col + dc)
}

fn view(app: &nannou::App, model: &Model, frame: nannou::frame::Frame) {
    let draw = app.draw();
    draw.background().color(color::BLACK);

    let window_rect = app.window_rect();
    let (width, height) = (window_rect.w(), window_rect.h());

    let stats_rect_width = 340.0;
    let stats_rect = Rect::from_w_h(stats_rect_width, height).shift_x(width / 2.0 - stats_rect_width / 2.0);
    let board_rect = Rect::from_w_h(width - stats_rect_width, height).shift_x(-stats_rect_width / 2.0);

    let side = board_rect.w().min(board_rect.h()) * 0.95;
    let grid = Rect::from_w_h(side, side).shift_x(board_rect.x()).shift_y(board_rect.y());
    let size = side / 15.0;
    let board = model.session.board();

    draw.rect()
        .x_y(grid.x(), grid.y())
        .w_h(grid.w(), grid.h())
        .color(color::WHITE);

    // Yards
    for color in Color::ALL {
        let origin = yard_origin(color);
        let (x, y) = cell_center(&grid, size, Cell::new(origin.row, origin.col));
        let (x, y) = (x + 2.5 * size, y - 2.5 * size);
        draw.rect().x_y(x, y).w_h(6.0 * size, 6.0 * size).color(strong(color));
        draw.rect().x_y(x, y).w_h(4.6 * size, 4.6 * size).color(color::WHITE);
    }

    // Common track
    for cell in COMMON_TRACK {
        let (x, y) = cell_center(&grid, size, cell);
        let fill = Color::ALL
            .into_iter()
            .find(|&c| board.paths().entry_cell(c) == cell)
            .map_or(color::WHITE, light);
        draw.rect()
            .x_y(x, y)
            .w_h(size, size)
            .color(fill)
            .stroke(color::DARKGRAY)
            .stroke_weight(1.0);
        if board.is_safe(cell) {
            draw.ellipse().x_y(x, y).w_h(size * 0.35, size * 0.35).color(color::SILVER);
        }
    }

    // Home stretches, skipping the turn-off cell which is part of the ring
    for color in Color::ALL {
        for cell in &board.paths().full_path(color)[52..] {
            let (x, y) = cell_center(&grid, size, *cell);
            draw.rect()
                .x_y(x, y)
                .w_h(size, size)
                .color(strong(color))
                .stroke(color::DARKGRAY)
                .stroke_weight(1.0);
        }
    }
    let (x, y) = cell_center(&grid, size, Cell::new(8, 8));
    draw.rect().x_y(x, y).w_h(size, size).color(color::BLACK);

    // Pieces
    let legal = model.session.legal_moves();
    let mut stacks: Vec<(Cell, Vec<PieceId>)> = Vec::new();
    for piece in board.all_pieces() {
        let cell = match board.position(piece) {
            Position::Home => yard_slot(piece),
            _ => match board.cell_of(piece) {
                Some(cell) => cell,
                None => continue,
            },
        };
        match stacks.iter_mut().find(|(c, _)| *c == cell) {
            Some((_, pieces)) => pieces.push(piece),
            None => stacks.push((cell, vec![piece])),
        }
    }
    for (cell, pieces) in stacks.iter() {
        let (cx, cy) = cell_center(&grid, size, *cell);
        let count = pieces.len();
        let diameter = if count == 1 { size * 0.75 } else { size * 0.5 };
        for (i, piece) in pieces.iter().enumerate() {
            let angle = i as f32 / count as f32 * std::f32::consts::TAU;
            let spread = if count == 1 { 0.0 } else { size * 0.22 };
            let (x, y) = (cx + angle.cos() * spread, cy + angle.sin() * spread);
            let highlighted = model.session.selected() == Some(*piece)
                || (model.human_to_move() && legal.contains(piece));
            draw.ellipse()
                .x_y(x, y)
                .w_h(diameter, diameter)
                .color(strong(piece.color()))
                .stroke(if highlighted { color::BLACK } else { color::DIMGRAY })
                .stroke_weight(if highlighted { 3.0 } else { 1.0 });
            draw.text(&piece.slot().to_string())
                .x_y(x, y)
                .font_size((diameter * 0.55) as u32)
                .color(color::WHITE);
        }
    }

    if let Some((_, _, Location::Cell(cell))) = model.feed.last_move {
        let (x, y) = cell_center(&grid, size, cell);
        draw.rect()
            .x_y(x, y)
            .w_h(size, size)
            .no_fill()
            .stroke(color::ORANGE)
            .stroke_weight(2.5);
    }

    // Side panel
    let x = stats_rect.x();
    let text_width = stats_rect_width - 20.0;
    let mut y = stats_rect.top() - 40.0;
    let mut line = |text: &str, font: u32, tint: Srgb<u8>, gap: f32| {
        draw.text(text).x_y(x, y).w(text_width).font_size(font).color(tint);
        y -= gap;
    };

    line("Ludo", 30, color::WHITE, 40.0);
    let turn = model.session.current_turn();
    if model.session.is_over() {
        line("Game over", 20, color::WHITE, 30.0);
    } else {
        let who = if model.human_to_move() { "you" } else { "computer" };
        line(&format!("Turn: {} ({})", turn, who), 20, strong(turn), 30.0);
    }
    line(&format!("Die: {}", model.feed.die_text()), 20, color::WHITE, 30.0);
    line(&format!("Computer: {}", model.difficulty), 16, color::WHITE, 24.0);
    for (place, color) in model.session.placements().iter().enumerate() {
        line(&format!("{}. {}", place + 1, color), 16, strong(*color), 22.0);
    }
    line(&model.feed.commentary, 14, color::LIGHTGRAY, 40.0);
    if !model.message.is_empty() {
        line(&model.message, 14, color::ORANGE, 30.0);
    }
    if model.human.is_some() {
        line("Space roll, 1-4 select, Enter move, Esc deselect", 12, color::GRAY, 30.0);
    }
    for entry in model.feed.log.iter().rev() {
        line(entry, 12, color::GRAY, 18.0);
    }

    draw.to_frame(app, &frame).unwrap();
}
