//! Streaming Demo: Demonstrates smooth reveal of a bursty token stream.
//!
//! This example simulates an LLM agent delivering markdown in irregular
//! chunks and shows Cadence draining it at a constant rate, with the
//! finalized prefix rendered from cache and the volatile tail re-rendered
//! each frame.
//!
//! Press Ctrl+C to quit early.

use cadence::{Engine, EngineConfig, MarkdownNode, Phase, RenderedNode, Snapshot, Ticker, TreeRenderer};
use crossbeam_channel::{select, unbounded};
use crossterm::{
    cursor::MoveTo,
    execute,
    style::{Attribute, Print, SetAttribute},
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

/// Sample text to stream (simulating an LLM response).
const SAMPLE_TEXT: &str = r#"I'd be happy to explain how Cadence keeps streaming output smooth!

## The Key Mechanism

Cadence separates *what arrived* from *what is shown*:

1. **Constant drain**: chunks land in a buffer and a fixed characters-per-second drain empties it, so bursty networks still read evenly.

2. **Boundary snapping**: the reveal never stops mid-word or inside an emoji cluster.

3. **Anchor advancement**: once a paragraph or code fence is provably complete, its rendered tree is cached and never recomputed.

Here is what that looks like for code:

```rust
fn main() {
    println!("revealed at a steady cadence");
}
```

Everything after the last safe boundary is re-rendered each frame, which is exactly the correctness-over-performance tradeoff you want while a fence might still be open.
"#;

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Simulated transport: a background thread delivers pseudo-random
    // chunk sizes with bursty pauses, then hangs up.
    let (chunk_tx, chunk_rx) = unbounded::<String>();
    thread::spawn(move || {
        let chars: Vec<char> = SAMPLE_TEXT.chars().collect();
        let mut index = 0;
        while index < chars.len() {
            let size = (index * 13 % 17) + 3;
            let end = (index + size).min(chars.len());
            let chunk: String = chars[index..end].iter().collect();
            if chunk_tx.send(chunk).is_err() {
                return;
            }
            index = end;
            let pause = if index % 5 == 0 { 220 } else { 25 };
            thread::sleep(Duration::from_millis(pause));
        }
    });

    let config = EngineConfig {
        target_cps: 120.0,
        ..EngineConfig::default()
    };
    let tick_interval = config.tick_interval;
    let mut engine = Engine::with_config(TreeRenderer::new(), config);
    let ticker = Ticker::spawn(tick_interval);

    let mut stdout = io::stdout();
    execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;

    // Phase 1: chunks still arriving.
    'streaming: loop {
        select! {
            recv(chunk_rx) -> chunk => match chunk {
                Ok(chunk) => {
                    if engine.feed(&chunk).is_err() {
                        engine.finish();
                        break 'streaming;
                    }
                }
                // Transport hung up: the stream is complete.
                Err(_) => {
                    engine.finish();
                    break 'streaming;
                }
            },
            recv(ticker.receiver()) -> tick => {
                let Ok(tick) = tick else { break 'streaming };
                engine.handle_tick(tick.delta);
                paint(&mut stdout, &engine.snapshot())?;
            }
        }
    }

    // Phase 2: drain the remainder to 100% at the same rate.
    while engine.phase() != Phase::Settled {
        let Ok(tick) = ticker.receiver().recv() else {
            break;
        };
        engine.handle_tick(tick.delta);
        paint(&mut stdout, &engine.snapshot())?;
    }

    ticker.join();
    writeln!(stdout, "\nDone. Final text was {} bytes.", engine.source().len())?;
    Ok(())
}

/// Repaint the whole frame from a snapshot.
fn paint(stdout: &mut io::Stdout, snapshot: &Snapshot<Vec<MarkdownNode>>) -> io::Result<()> {
    execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;

    print_span(stdout, &snapshot.stable, false)?;
    print_span(stdout, &snapshot.streaming, true)?;

    if snapshot.is_typing {
        execute!(stdout, SetAttribute(Attribute::Reverse), Print(" "), SetAttribute(Attribute::Reset))?;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = (snapshot.progress * 100.0) as u8;
    execute!(
        stdout,
        Print(format!("\n\n[{:?}] {percent}% revealed\n", snapshot.phase))
    )?;
    stdout.flush()
}

/// Print one rendered span; the streaming span is dimmed.
fn print_span(
    stdout: &mut io::Stdout,
    node: &RenderedNode<Vec<MarkdownNode>>,
    dim: bool,
) -> io::Result<()> {
    if dim {
        execute!(stdout, SetAttribute(Attribute::Dim))?;
    }
    match node {
        RenderedNode::Rendered(blocks) => {
            for block in blocks {
                print_block(stdout, block, 0)?;
            }
        }
        RenderedNode::Raw(text) => execute!(stdout, Print(text))?,
    }
    if dim {
        execute!(stdout, SetAttribute(Attribute::Reset))?;
    }
    Ok(())
}

fn print_block(stdout: &mut io::Stdout, block: &MarkdownNode, indent: usize) -> io::Result<()> {
    let pad = "  ".repeat(indent);
    match block {
        MarkdownNode::Paragraph(text) => execute!(stdout, Print(format!("{pad}{text}\n\n"))),
        MarkdownNode::Heading { level, text } => execute!(
            stdout,
            SetAttribute(Attribute::Bold),
            Print(format!("{pad}{} {text}\n\n", "#".repeat(*level as usize))),
            SetAttribute(Attribute::Reset)
        ),
        MarkdownNode::CodeBlock { language, code } => {
            let lang = language.as_deref().unwrap_or("");
            execute!(stdout, Print(format!("{pad}--- {lang}\n")))?;
            for line in code.lines() {
                execute!(stdout, Print(format!("{pad}| {line}\n")))?;
            }
            execute!(stdout, Print(format!("{pad}---\n\n")))
        }
        MarkdownNode::List { items, .. } => {
            for item in items {
                print_block(stdout, item, indent)?;
            }
            execute!(stdout, Print("\n"))
        }
        MarkdownNode::Item(children) => {
            execute!(stdout, Print(format!("{pad}- ")))?;
            for child in children {
                match child {
                    MarkdownNode::Paragraph(text) => {
                        execute!(stdout, Print(format!("{text}\n")))?;
                    }
                    other => print_block(stdout, other, indent + 1)?,
                }
            }
            Ok(())
        }
        MarkdownNode::BlockQuote(children) => {
            for child in children {
                print_block(stdout, child, indent + 1)?;
            }
            Ok(())
        }
        MarkdownNode::Rule => execute!(stdout, Print(format!("{pad}----------\n\n"))),
        MarkdownNode::Html(html) => execute!(stdout, Print(format!("{pad}{html}\n"))),
    }
}
