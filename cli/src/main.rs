mod config;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use console::style;
use rustyline::error::ReadlineError;
use rustyline::Editor;
use ucon_core::{parse_quantity, parse_unit_expression, ConversionGraph, Error, Number};

/// Splits `input` on the first top-level `->`, i.e. one not nested inside
/// parentheses, mirroring the teacher's `arrow_conversion` grammar layer
/// but generalized to a unit-aware quantity on the left and a bare unit
/// expression on the right (§6a).
fn split_arrow(input: &str) -> Option<(&str, &str)> {
    let mut depth = 0i32;
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => depth -= 1,
            b'-' if depth == 0 && bytes.get(i + 1) == Some(&b'>') => {
                return Some((&input[..i], &input[i + 2..]));
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn evaluate(input: &str, graph: &ConversionGraph) -> Result<Number, Error> {
    let input = input.trim();
    if let Some((lhs, rhs)) = split_arrow(input) {
        let quantity = parse_quantity(lhs.trim(), graph)?;
        let target = parse_unit_expression(rhs.trim(), graph)?;
        quantity.to(&target, graph)
    } else {
        parse_quantity(input, graph)
    }
}

fn print_error(err: &Error, color: bool) {
    // `Error::ParseError`'s `#[error(...)]` template already renders the
    // offending input and a caret line; everything else renders as a
    // single message.
    if color {
        eprintln!("{}: {}", style("error").red().bold(), err);
    } else {
        eprintln!("error: {err}");
    }
}

fn print_result(number: &Number, color: bool) {
    let line = number.to_string();
    if color {
        println!("{}", style(line).green());
    } else {
        println!("{line}");
    }
}

/// Evaluates stdin line by line with no prompt or history, for piped
/// input (`echo "60 mi/h -> m/s" | ucon`).
fn run_piped(graph: &ConversionGraph, color: bool) -> bool {
    use std::io::BufRead;
    let mut ok = true;
    for line in std::io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match evaluate(trimmed, graph) {
            Ok(number) => print_result(&number, color),
            Err(err) => {
                print_error(&err, color);
                ok = false;
            }
        }
    }
    ok
}

/// Evaluates a one-shot expression passed on the command line
/// (`ucon "60 mi/h -> m/s"`).
fn run_oneshot(expr: &str, graph: &ConversionGraph, color: bool) -> bool {
    match evaluate(expr, graph) {
        Ok(number) => {
            print_result(&number, color);
            true
        }
        Err(err) => {
            print_error(&err, color);
            false
        }
    }
}

fn run_repl(graph: &ConversionGraph, cfg: &config::CliConfig) {
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = Arc::clone(&interrupted);
        if let Err(err) = ctrlc::set_handler(move || {
            interrupted.store(true, Ordering::SeqCst);
        }) {
            eprintln!("warning: failed to install interrupt handler: {err}");
        }
    }

    let mut editor = match Editor::<()>::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("error: failed to start line editor: {err}");
            std::process::exit(1);
        }
    };

    loop {
        if interrupted.swap(false, Ordering::SeqCst) {
            println!();
            continue;
        }
        match editor.readline(&cfg.prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "quit" || trimmed == "exit" {
                    break;
                }
                editor.add_history_entry(trimmed);
                match evaluate(trimmed, graph) {
                    Ok(number) => print_result(&number, cfg.color),
                    Err(err) => print_error(&err, cfg.color),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("error: {err}");
                break;
            }
        }
    }
}

fn main() {
    env_logger::init();

    let cfg = config::load();
    let graph = ucon_core::standard::conversion_graph().with_tolerance(cfg.engine.cyclic_consistency_tolerance);

    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        let expr = args.join(" ");
        let ok = run_oneshot(&expr, &graph, cfg.color);
        std::process::exit(if ok { 0 } else { 1 });
    }

    if atty::is(atty::Stream::Stdin) {
        run_repl(&graph, &cfg);
    } else {
        let ok = run_piped(&graph, cfg.color);
        std::process::exit(if ok { 0 } else { 1 });
    }
}
