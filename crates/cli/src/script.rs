use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use layerwalk_core::ProgramState;
use layerwalk_core::model::{Edit, EditOutcome, ExampleId};
use layerwalk_protocol::{CameraPose, Directive, Vec3};
use serde::Serialize;

/// One toolbar, keyboard or render-loop event, as written in a script.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Next,
    Prev,
    Tick(f64),
    Seek(f64),
    Expand,
    Magnify,
    Select(ExampleId),
    /// Intermediate step of a drag gesture.
    Drag { block: String, delta: Vec3 },
    /// Final step of a drag gesture.
    Drop { block: String, delta: Vec3 },
    /// End the current gesture without changing anything.
    Cancel,
    Undo,
    Redo,
    Dismiss,
    Status,
}

fn parse_f64(word: Option<&str>, what: &str) -> Result<f64> {
    let word = word.ok_or_else(|| anyhow!("missing {what}"))?;
    word.parse::<f64>()
        .with_context(|| format!("invalid {what} {word:?}"))
}

fn parse_block_delta<'a>(mut words: impl Iterator<Item = &'a str>) -> Result<(String, Vec3)> {
    let block = words.next().ok_or_else(|| anyhow!("missing block id"))?;
    let x = parse_f64(words.next(), "dx")?;
    let y = parse_f64(words.next(), "dy")?;
    let z = parse_f64(words.next(), "dz")?;
    Ok((block.to_string(), Vec3::new(x as f32, y as f32, z as f32)))
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or_else(|| anyhow!("empty command"))?;
        let command = match name {
            "next" => Self::Next,
            "prev" => Self::Prev,
            "tick" => Self::Tick(parse_f64(words.next(), "elapsed time")?),
            "seek" => Self::Seek(parse_f64(words.next(), "time")?),
            "expand" => Self::Expand,
            "magnify" => Self::Magnify,
            "select" => {
                let id = words.next().ok_or_else(|| anyhow!("missing example id"))?;
                Self::Select(ExampleId(
                    id.parse::<i32>()
                        .with_context(|| format!("invalid example id {id:?}"))?,
                ))
            }
            "drag" => {
                let (block, delta) = parse_block_delta(&mut words)?;
                Self::Drag { block, delta }
            }
            "drop" => {
                let (block, delta) = parse_block_delta(&mut words)?;
                Self::Drop { block, delta }
            }
            "cancel" => Self::Cancel,
            "undo" => Self::Undo,
            "redo" => Self::Redo,
            "dismiss" => Self::Dismiss,
            "status" => Self::Status,
            other => bail!("unknown command {other:?}"),
        };
        if let Some(extra) = words.next() {
            bail!("unexpected argument {extra:?} after {name}");
        }
        Ok(command)
    }
}

/// Parse a script: one command per line, `#` starts a comment.
pub fn parse_script(text: &str) -> Result<Vec<Command>> {
    text.lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.split('#').next().unwrap_or_default().trim();
            (!line.is_empty()).then_some((index, line))
        })
        .map(|(index, line)| {
            line.parse::<Command>()
                .with_context(|| format!("line {}: {line}", index + 1))
        })
        .collect()
}

/// State observed after one command, printed as a JSON line.
#[derive(Debug, Serialize)]
pub struct Step {
    pub command: String,
    pub time: f64,
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directive: Option<Directive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraPose>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit: Option<&'static str>,
    pub example: i32,
    pub undo_depth: usize,
    pub redo_depth: usize,
    pub version: u64,
}

fn outcome_name(outcome: EditOutcome) -> &'static str {
    match outcome {
        EditOutcome::Unchanged => "unchanged",
        EditOutcome::Speculative => "speculative",
        EditOutcome::Committed => "committed",
    }
}

/// Apply one command to the program state.
pub fn execute(state: &mut ProgramState, command: &Command) -> Step {
    let mut directive = None;
    let mut camera = None;
    let mut edit = None;

    match command {
        Command::Next => directive = Some(state.advance()),
        Command::Prev => directive = Some(state.retreat()),
        Command::Tick(elapsed) => {
            state.tick(*elapsed);
        }
        Command::Seek(time) => {
            state.seek(*time);
        }
        Command::Expand => camera = Some(state.expand()),
        Command::Magnify => camera = Some(state.magnify()),
        Command::Select(id) => {
            camera = state.select_example(*id).map(|example| example.camera);
            if camera.is_none() {
                tracing::warn!(%id, "no such example");
            }
        }
        Command::Drag { block, delta } => {
            let outcome = state.apply_edit(false, |layout| layout.move_block(block, *delta));
            edit = Some(outcome_name(outcome));
        }
        Command::Drop { block, delta } => {
            let outcome = state.apply_edit(true, |layout| layout.move_block(block, *delta));
            edit = Some(outcome_name(outcome));
        }
        Command::Cancel => {
            let outcome = state.apply_edit(true, |_| Edit::Unchanged);
            edit = Some(outcome_name(outcome));
        }
        Command::Undo => {
            state.undo();
        }
        Command::Redo => {
            state.redo();
        }
        Command::Dismiss => {
            state.dismiss_popup();
        }
        Command::Status => directive = Some(state.current_directive()),
    }

    let walkthrough = state.walkthrough();
    Step {
        command: format!("{command:?}"),
        time: walkthrough.time(),
        running: walkthrough.is_running(),
        directive,
        camera,
        edit,
        example: state.examples().current_id().0,
        undo_depth: state.history().undo_depth(),
        redo_depth: state.history().redo_depth(),
        version: state.version(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layerwalk_core::ProgramConfig;

    const CONFIG: &str = r#"{
        "phase_length": 30,
        "times": [
            { "start": 0, "end": 5, "kind": "commentary", "text": ["Intro"] },
            { "start": 10, "end": 15, "kind": "commentary", "text": ["Attention"], "anchor": "top-right" }
        ],
        "main_example": { "name": "main", "camera": { "center": [0, 0, 0], "angle": [270, 4.5, 12] } },
        "layout": {
            "blocks": [ { "id": "attn0", "position": [0, 0, 0], "size": [1, 1, 1] } ],
            "residual": [0, 48, 0]
        }
    }"#;

    fn state() -> ProgramState {
        ProgramConfig::from_json_str(CONFIG)
            .and_then(ProgramConfig::into_state)
            .unwrap()
    }

    #[test]
    fn parses_commands() {
        assert_eq!("next".parse::<Command>().unwrap(), Command::Next);
        assert_eq!("tick 0.25".parse::<Command>().unwrap(), Command::Tick(0.25));
        assert_eq!(
            "select -1".parse::<Command>().unwrap(),
            Command::Select(ExampleId::MAIN)
        );
        assert_eq!(
            "drag attn0 1 0 -2".parse::<Command>().unwrap(),
            Command::Drag {
                block: "attn0".into(),
                delta: Vec3::new(1.0, 0.0, -2.0)
            }
        );
    }

    #[test]
    fn rejects_bad_commands() {
        assert!("jump".parse::<Command>().is_err());
        assert!("tick".parse::<Command>().is_err());
        assert!("seek soon".parse::<Command>().is_err());
        assert!("drag attn0 1 2".parse::<Command>().is_err());
        assert!("next please".parse::<Command>().is_err());
    }

    #[test]
    fn script_skips_comments_and_reports_lines() {
        let script = "# warm up\nnext\n\ntick 1 # one second\n";
        assert_eq!(
            parse_script(script).unwrap(),
            vec![Command::Next, Command::Tick(1.0)]
        );

        let err = parse_script("next\nfly").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn executes_navigation_and_edits() {
        let mut state = state();
        let step = execute(&mut state, &Command::Next);
        assert!(step.running);
        assert_eq!(step.directive.map(|d| d.text), Some("Intro".to_string()));

        let step = execute(&mut state, &Command::Seek(7.0));
        assert!((step.time - 7.0).abs() < f64::EPSILON);

        let step = execute(&mut state, &Command::Prev);
        assert_eq!(step.time, 0.0);

        let drag = Command::Drag {
            block: "attn0".into(),
            delta: Vec3::X,
        };
        assert_eq!(execute(&mut state, &drag).edit, Some("speculative"));
        assert_eq!(execute(&mut state, &Command::Cancel).edit, Some("unchanged"));
        let drop = Command::Drop {
            block: "attn0".into(),
            delta: Vec3::X,
        };
        let step = execute(&mut state, &drop);
        assert_eq!(step.edit, Some("committed"));
        assert_eq!(step.undo_depth, 1);

        let step = execute(&mut state, &Command::Undo);
        assert_eq!((step.undo_depth, step.redo_depth), (0, 1));
    }

    #[test]
    fn select_reports_camera_only_when_it_moves() {
        let mut state = state();
        assert!(execute(&mut state, &Command::Magnify).camera.is_some());

        let step = execute(&mut state, &Command::Select(ExampleId(3)));
        assert!(step.camera.is_none());
        assert_eq!(step.example, -1);

        let step = execute(&mut state, &Command::Select(ExampleId::MAIN));
        assert_eq!(
            step.camera.map(|c| c.angle),
            Some(Vec3::new(270.0, 4.5, 12.0))
        );
    }

    #[test]
    fn magnify_reports_camera() {
        let mut state = state();
        let step = execute(&mut state, &Command::Magnify);
        let camera = step.camera.unwrap();
        assert_eq!(camera.center, Vec3::new(0.0, 48.0, 0.0));
    }
}
