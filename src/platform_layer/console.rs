/*
 * A line-oriented stand-in for the kiosk front end. Each operator line becomes
 * one or more `AppEvent`s; every command the handler queues is executed here by
 * printing the screen, laying the gallery out on a fixed grid, and writing
 * exported galleries as plain-text manifests. Events produced while executing
 * commands (layout reports, export completions) are fed back to the handler
 * before the next line is read, the way a native message loop would deliver them.
 */
use super::error::{PlatformError, Result as PlatformResult};
use super::types::{
    AppEvent, GalleryCardView, MessageSeverity, PlatformCommand, PlatformEventHandler, ScreenView,
};
use crate::core::{CardBounds, Point, Rect};

use std::collections::VecDeque;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const GRID_COLUMNS: usize = 3;
const CARD_SIZE: f32 = 200.0;
const CARD_GAP: f32 = 20.0;
const DELETE_CONTROL_SIZE: f32 = 32.0;

const HELP_TEXT: &str = "\
Commands:
  begin | next | back | include
  remove <id> | export | start-over | gallery | new
  drag <source-id> <target-id>
  touch <source-id> <x> <y> <x2> <y2>
  help | quit";

#[derive(Debug, PartialEq)]
enum ConsoleInput {
    Events(Vec<AppEvent>),
    Help,
    Quit,
}

pub struct ConsolePlatform {
    export_dir: PathBuf,
    follow_up_events: VecDeque<AppEvent>,
}

impl ConsolePlatform {
    pub fn new(export_dir: &Path) -> Self {
        ConsolePlatform {
            export_dir: export_dir.to_path_buf(),
            follow_up_events: VecDeque::new(),
        }
    }

    /*
     * Runs until `quit` or end of input. Unparseable lines are reported to the
     * operator and skipped; only terminal I/O failures end the loop early.
     */
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        event_handler: Arc<Mutex<dyn PlatformEventHandler>>,
        input: R,
        output: &mut W,
    ) -> PlatformResult<()> {
        {
            let mut handler = lock_handler(&event_handler)?;
            handler.on_startup();
        }
        self.process_pending(&event_handler, output)?;

        for line in input.lines() {
            let line = line?;
            match parse_input(&line) {
                Ok(Some(ConsoleInput::Events(events))) => {
                    for event in events {
                        self.follow_up_events.push_back(event);
                        self.process_pending(&event_handler, output)?;
                    }
                }
                Ok(Some(ConsoleInput::Help)) => writeln!(output, "{HELP_TEXT}")?,
                Ok(Some(ConsoleInput::Quit)) => break,
                Ok(None) => {}
                Err(e) => {
                    log::debug!("Platform: {e}");
                    writeln!(output, "{e}. Type 'help' for commands.")?;
                }
            }
        }

        lock_handler(&event_handler)?.on_quit();
        log::info!("Platform: Console loop exited cleanly.");
        Ok(())
    }

    // Drains the handler's command queue, then delivers any follow-up events, until both are empty.
    fn process_pending<W: Write>(
        &mut self,
        event_handler: &Arc<Mutex<dyn PlatformEventHandler>>,
        output: &mut W,
    ) -> PlatformResult<()> {
        loop {
            let commands = {
                let mut handler = lock_handler(event_handler)?;
                if let Some(event) = self.follow_up_events.pop_front() {
                    handler.handle_event(event);
                }
                let mut commands = Vec::new();
                while let Some(command) = handler.try_dequeue_command() {
                    commands.push(command);
                }
                commands
            };
            for command in commands {
                self.execute_command(command, output)?;
            }
            if self.follow_up_events.is_empty() {
                return Ok(());
            }
        }
    }

    pub fn execute_command<W: Write>(
        &mut self,
        command: PlatformCommand,
        output: &mut W,
    ) -> PlatformResult<()> {
        match command {
            PlatformCommand::RenderScreen { view } => {
                write_screen(&view, output)?;
                if let ScreenView::Arrangement(arrangement) = &view {
                    self.follow_up_events
                        .push_back(AppEvent::GalleryLayoutUpdated {
                            cards: grid_layout(&arrangement.cards),
                        });
                }
            }
            PlatformCommand::RasterizeGallery { file_stem, works } => {
                let result = write_export(&self.export_dir, &file_stem, &works)
                    .map_err(|e| e.to_string());
                if let Err(e) = &result {
                    log::error!("Platform: Export failed: {e}");
                }
                self.follow_up_events
                    .push_back(AppEvent::ExportCompleted { result });
            }
            PlatformCommand::ShowMessage { severity, text } => {
                let tag = match severity {
                    MessageSeverity::Error => "error",
                };
                writeln!(output, "[{tag}] {text}")?;
            }
            PlatformCommand::SetDropHighlight {
                work_id,
                highlighted,
            } => log::trace!("Platform: highlight '{work_id}' = {highlighted}"),
            PlatformCommand::SetItemDragging { work_id, dragging } => {
                log::trace!("Platform: dragging '{work_id}' = {dragging}")
            }
            PlatformCommand::ShowDragProxy { work_id, bounds } => {
                log::trace!("Platform: proxy for '{work_id}' at {bounds:?}")
            }
            PlatformCommand::MoveDragProxy { bounds } => {
                log::trace!("Platform: proxy moved to {bounds:?}")
            }
            PlatformCommand::RemoveDragProxy => log::trace!("Platform: proxy removed"),
        }
        Ok(())
    }
}

fn lock_handler(
    event_handler: &Arc<Mutex<dyn PlatformEventHandler>>,
) -> PlatformResult<std::sync::MutexGuard<'_, dyn PlatformEventHandler + 'static>> {
    event_handler
        .lock()
        .map_err(|_| PlatformError::HandlerUnavailable)
}

fn parse_input(line: &str) -> PlatformResult<Option<ConsoleInput>> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();
    let single = |event: AppEvent| -> PlatformResult<Option<ConsoleInput>> {
        Ok(Some(ConsoleInput::Events(vec![event])))
    };

    match (command.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("begin", []) => single(AppEvent::BeginClicked),
        ("next", []) => single(AppEvent::NextClicked),
        ("back", []) => single(AppEvent::BackClicked),
        ("include", []) => single(AppEvent::IncludeToggled),
        ("export", []) => single(AppEvent::ExportClicked),
        ("start-over", []) => single(AppEvent::StartOverClicked),
        ("gallery", []) => single(AppEvent::BackToGalleryClicked),
        ("new", []) => single(AppEvent::NewViewerClicked),
        ("remove", [work_id]) => single(AppEvent::RemoveFromGalleryClicked {
            work_id: work_id.to_string(),
        }),
        ("drag", [source, target]) => Ok(Some(ConsoleInput::Events(vec![
            AppEvent::PointerDragStarted {
                work_id: source.to_string(),
            },
            AppEvent::PointerDragEntered {
                work_id: target.to_string(),
            },
            AppEvent::PointerDropped {
                target_work_id: target.to_string(),
            },
            AppEvent::PointerDragEnded,
        ]))),
        ("touch", [source, x, y, x2, y2]) => {
            let start = Point::new(parse_coordinate(x)?, parse_coordinate(y)?);
            let end = Point::new(parse_coordinate(x2)?, parse_coordinate(y2)?);
            Ok(Some(ConsoleInput::Events(vec![
                AppEvent::TouchStarted {
                    work_id: source.to_string(),
                    point: start,
                },
                AppEvent::TouchMoved { point: end },
                AppEvent::TouchEnded { point: end },
            ])))
        }
        ("help" | "?", []) => Ok(Some(ConsoleInput::Help)),
        ("quit" | "exit", []) => Ok(Some(ConsoleInput::Quit)),
        _ => Err(PlatformError::InvalidInput(line.trim().to_string())),
    }
}

fn parse_coordinate(value: &str) -> PlatformResult<f32> {
    value
        .parse::<f32>()
        .map_err(|_| PlatformError::InvalidInput(format!("not a coordinate: {value}")))
}

/// Lays cards out left to right, top to bottom, with the delete control in each card's top-right corner.
pub fn grid_layout(cards: &[GalleryCardView]) -> Vec<CardBounds> {
    cards
        .iter()
        .enumerate()
        .map(|(i, card)| {
            let column = (i % GRID_COLUMNS) as f32;
            let row = (i / GRID_COLUMNS) as f32;
            let x = column * (CARD_SIZE + CARD_GAP);
            let y = row * (CARD_SIZE + CARD_GAP);
            CardBounds {
                work_id: card.work_id.clone(),
                card: Rect::new(x, y, CARD_SIZE, CARD_SIZE),
                delete_control: Some(Rect::new(
                    x + CARD_SIZE - DELETE_CONTROL_SIZE,
                    y,
                    DELETE_CONTROL_SIZE,
                    DELETE_CONTROL_SIZE,
                )),
            }
        })
        .collect()
}

fn write_export(dir: &Path, file_stem: &str, works: &[GalleryCardView]) -> PlatformResult<PathBuf> {
    if works.is_empty() {
        return Err(PlatformError::ExportFailed("nothing to export".to_string()));
    }
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{file_stem}.txt"));
    let mut manifest = String::new();
    for (position, work) in works.iter().enumerate() {
        manifest.push_str(&format!("{}\t{}\t{}\n", position + 1, work.work_id, work.image_ref));
    }
    fs::write(&path, manifest)?;
    log::info!("Platform: Wrote export manifest to {path:?}");
    Ok(path)
}

fn write_screen<W: Write>(view: &ScreenView, output: &mut W) -> PlatformResult<()> {
    match view {
        ScreenView::Orientation(v) => {
            writeln!(output, "== {} ==", v.title)?;
            writeln!(output, "{}", v.statement)?;
            if v.content_available {
                writeln!(output, "[begin]")?;
            }
        }
        ScreenView::Framing(v) => {
            writeln!(output, "-- {} ({}) --", v.section_header, v.counter)?;
            writeln!(output, "{}", v.framing_text)?;
            writeln!(output, "[back] [next]")?;
        }
        ScreenView::Artwork(v) => {
            writeln!(output, "<{}> {}", v.alt_text, v.image_ref)?;
            writeln!(output, "{}", v.context_text)?;
            let mark = if v.included { "x" } else { " " };
            writeln!(output, "[{mark}] include   [back] [{}]", v.next_label)?;
        }
        ScreenView::Arrangement(v) => {
            writeln!(output, "== Your installation ==")?;
            match &v.empty_message {
                Some(message) => writeln!(output, "{message}")?,
                None => {
                    for (position, card) in v.cards.iter().enumerate() {
                        writeln!(output, "{:>2}. {} ({})", position + 1, card.work_id, card.image_ref)?;
                    }
                }
            }
            writeln!(output, "[export] [start-over]")?;
        }
        ScreenView::Export => {
            writeln!(output, "== Installation saved ==")?;
            writeln!(output, "[gallery] [new]")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // Records every event it receives and answers each with a scripted command list.
    struct ScriptedHandler {
        events: Arc<Mutex<Vec<AppEvent>>>,
        startup_commands: Vec<PlatformCommand>,
        queue: VecDeque<PlatformCommand>,
    }

    impl PlatformEventHandler for ScriptedHandler {
        fn on_startup(&mut self) {
            self.queue.extend(self.startup_commands.drain(..));
        }
        fn handle_event(&mut self, event: AppEvent) {
            self.events.lock().unwrap().push(event);
        }
        fn try_dequeue_command(&mut self) -> Option<PlatformCommand> {
            self.queue.pop_front()
        }
    }

    fn card(id: &str) -> GalleryCardView {
        GalleryCardView {
            work_id: id.to_string(),
            image_ref: format!("images/{id}.jpg"),
        }
    }

    #[test]
    fn test_parse_input_commands() {
        assert_eq!(
            parse_input("  next ").unwrap(),
            Some(ConsoleInput::Events(vec![AppEvent::NextClicked]))
        );
        assert_eq!(parse_input("").unwrap(), None);
        assert_eq!(parse_input("QUIT").unwrap(), Some(ConsoleInput::Quit));
        assert_eq!(
            parse_input("remove W2").unwrap(),
            Some(ConsoleInput::Events(vec![AppEvent::RemoveFromGalleryClicked {
                work_id: "W2".to_string()
            }]))
        );
        match parse_input("drag W3 W1").unwrap() {
            Some(ConsoleInput::Events(events)) => {
                assert_eq!(events.len(), 4);
                assert_eq!(events[3], AppEvent::PointerDragEnded);
            }
            other => panic!("Expected drag events, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_input_rejects_bad_lines() {
        assert!(matches!(
            parse_input("dance"),
            Err(PlatformError::InvalidInput(_))
        ));
        assert!(parse_input("remove").is_err());
        assert!(parse_input("touch W1 1 2 three 4").is_err());
    }

    #[test]
    fn test_grid_layout_wraps_rows() {
        let cards: Vec<GalleryCardView> = ["A", "B", "C", "D"].into_iter().map(card).collect();
        let layout = grid_layout(&cards);
        assert_eq!(layout.len(), 4);
        assert_eq!(layout[2].card, Rect::new(440.0, 0.0, 200.0, 200.0));
        assert_eq!(layout[3].card, Rect::new(0.0, 220.0, 200.0, 200.0));
        let delete = layout[0].delete_control.unwrap();
        assert!(layout[0].card.contains(Point::new(delete.x, delete.y)));
    }

    #[test]
    fn test_rasterize_writes_manifest_and_reports_back() {
        let dir = tempdir().unwrap();
        let mut platform = ConsolePlatform::new(dir.path());
        let mut out = Vec::new();

        platform
            .execute_command(
                PlatformCommand::RasterizeGallery {
                    file_stem: "my-installation".to_string(),
                    works: vec![card("W3"), card("W1")],
                },
                &mut out,
            )
            .unwrap();

        let expected_path = dir.path().join("my-installation.txt");
        assert_eq!(
            platform.follow_up_events.pop_front(),
            Some(AppEvent::ExportCompleted {
                result: Ok(expected_path.clone())
            })
        );
        let manifest = fs::read_to_string(expected_path).unwrap();
        assert_eq!(manifest, "1\tW3\timages/W3.jpg\n2\tW1\timages/W1.jpg\n");
    }

    #[test]
    fn test_run_feeds_layout_back_after_gallery_render() {
        let dir = tempdir().unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let handler = ScriptedHandler {
            events: Arc::clone(&events),
            startup_commands: vec![PlatformCommand::RenderScreen {
                view: ScreenView::Arrangement(crate::platform_layer::types::ArrangementView {
                    cards: vec![card("W1")],
                    empty_message: None,
                }),
            }],
            queue: VecDeque::new(),
        };
        let handler: Arc<Mutex<dyn PlatformEventHandler>> = Arc::new(Mutex::new(handler));
        let mut platform = ConsolePlatform::new(dir.path());
        let mut out = Vec::new();

        platform
            .run(handler, "next\nbogus\nquit\nback\n".as_bytes(), &mut out)
            .unwrap();

        let received = events.lock().unwrap().clone();
        assert_eq!(received.len(), 2);
        assert!(matches!(
            &received[0],
            AppEvent::GalleryLayoutUpdated { cards } if cards.len() == 1
        ));
        assert_eq!(received[1], AppEvent::NextClicked);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains(" 1. W1 (images/W1.jpg)"));
        assert!(printed.contains("bogus"));
    }
}
