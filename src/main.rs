use std::{
    fs::File,
    io::stdout,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::{builder::RangedU64ValueParser, Parser};
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use log::info;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use simplelog::{Config, LevelFilter, WriteLogger};

use snake::{
    game::{
        CellState, Game, GameEvent, GameState, RandomFoodSource, DEFAULT_BOARD_SIZE,
        MAX_BOARD_SIZE, MIN_BOARD_SIZE, TICK_MS,
    },
    input::{map_key, KeyAction},
    store::{BestScore, FileStore, DEFAULT_BEST_SCORE_FILE},
};

// ============================================================================
// Configuration
// ============================================================================

#[derive(Parser)]
#[command(name = "snake", version, about = "Snake on a wrapping grid")]
struct Cli {
    /// Cells per board side
    #[arg(
        long,
        default_value_t = DEFAULT_BOARD_SIZE,
        value_parser = RangedU64ValueParser::<usize>::new()
            .range(MIN_BOARD_SIZE as u64..=MAX_BOARD_SIZE as u64)
    )]
    board_size: usize,

    /// Milliseconds between moves
    #[arg(long, default_value_t = TICK_MS)]
    tick_ms: u64,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Where the best score is kept
    #[arg(long, default_value = DEFAULT_BEST_SCORE_FILE)]
    best_score_file: PathBuf,

    #[arg(long, default_value = "snake.log")]
    log_file: PathBuf,

    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const HEAD_CHAR: &str = "██";
const BODY_CHAR: &str = "▓▓";
const FOOD_CHAR: &str = "●●";
const EMPTY_CHAR: &str = "  ";

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, game: &Game, best: u32) {
    let area = frame.size();

    render_game(frame, game, best, area);
    if game.state() == GameState::Over {
        render_game_over(frame, game, best, area);
    }
}

fn render_game(frame: &mut Frame, game: &Game, best: u32, area: Rect) {
    // At most MAX_BOARD_SIZE, so the cast is lossless
    let size = game.board_size() as u16;
    let grid_display_width = (size * CELL_WIDTH) + 2;
    let grid_display_height = size + 2;
    let info_width = 14;
    let total_width = grid_display_width + info_width + 2;
    let total_height = grid_display_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    // Layout: [Grid][Info]
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(info_width),
    ])
    .split(game_row);

    render_grid(frame, game, horizontal[0]);
    render_info(frame, game, best, horizontal[1]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "Arrows/WASD: Steer | R: Restart | Q/ESC: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Snake ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = game
        .render_grid()
        .into_iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .into_iter()
                .map(|cell| match cell {
                    CellState::Empty => Span::raw(EMPTY_CHAR),
                    CellState::Head => Span::styled(
                        HEAD_CHAR,
                        Style::default()
                            .fg(Color::LightGreen)
                            .add_modifier(Modifier::BOLD),
                    ),
                    CellState::Body => Span::styled(BODY_CHAR, Style::default().fg(Color::Green)),
                    CellState::Food => Span::styled(FOOD_CHAR, Style::default().fg(Color::Red)),
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, game: &Game, best: u32, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", game.score())),
        Line::from(""),
        Line::from(Span::styled("Best", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", best)),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_game_over(frame: &mut Frame, game: &Game, best: u32, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", game.score())),
        Line::from(format!("Best: {}", best)),
        Line::from(""),
        Line::from(Span::styled(
            "Press R to restart",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Press ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Game Over ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(24, 11, area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Main Loop
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    game: &mut Game,
    best: &mut BestScore<FileStore>,
    tick_duration: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal
            .draw(|frame| render(frame, game, best.value()))
            .context("failed to draw frame")?;

        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match map_key(key) {
                        KeyAction::Quit => break,
                        KeyAction::Restart => {
                            game.reset();
                            last_tick = Instant::now();
                        }
                        KeyAction::Steer(direction) => {
                            game.set_direction(direction);
                        }
                        KeyAction::None => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_duration {
            // Ticks stop once the game is over, until a restart
            if game.state() == GameState::Running {
                game.tick();
            }
            last_tick = Instant::now();
        }

        for event in game.take_events() {
            if let GameEvent::GameOver { score } = event {
                best.record(score);
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("failed to create log file {}", cli.log_file.display()))?;
    WriteLogger::init(cli.log_level, Config::default(), log_file)
        .context("failed to initialize logger")?;

    let food_source = match cli.seed {
        Some(seed) => RandomFoodSource::seeded(seed),
        None => RandomFoodSource::from_entropy(),
    };
    let mut game = Game::with_source(cli.board_size, Box::new(food_source))
        .context("failed to create game")?;
    let mut best = BestScore::load(FileStore::new(&cli.best_score_file));
    info!(
        "starting {0}x{0} game, best score {1}",
        cli.board_size,
        best.value()
    );

    enable_raw_mode().context("failed to enable raw mode")?;
    stdout()
        .execute(EnterAlternateScreen)
        .context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let result = run(
        &mut terminal,
        &mut game,
        &mut best,
        Duration::from_millis(cli.tick_ms),
    );

    disable_raw_mode().context("failed to disable raw mode")?;
    stdout()
        .execute(LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;

    result
}
