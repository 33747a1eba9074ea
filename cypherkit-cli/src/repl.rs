use crate::{OutputFormat, write_compiled};
use anyhow::Result;
use cypherkit_query::QueryBuilder;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::time::Instant;

/// Statement under construction. A payload that fails to parse or render
/// leaves it untouched.
#[derive(Default)]
struct Session {
    builder: QueryBuilder,
}

impl Session {
    fn add(&mut self, payload: &str) -> cypherkit_query::Result<String> {
        let mut candidate = self.builder.clone();
        candidate.add_json_str(payload)?;
        let statement = candidate.statement()?;
        self.builder = candidate;
        Ok(statement)
    }

    fn reset(&mut self) {
        self.builder = QueryBuilder::new();
    }
}

pub fn run_repl() -> Result<()> {
    println!("cypherkit REPL v{}", env!("CARGO_PKG_VERSION"));
    println!("Type .help for instructions, .exit to quit.\n");

    let mut rl = DefaultEditor::new()?;
    let mut session = Session::default();

    loop {
        match rl.readline("cypherkit> ") {
            Ok(line) => {
                let line = line.trim();
                let _ = rl.add_history_entry(line);

                if line.is_empty() {
                    continue;
                }

                if line.starts_with('.') {
                    match line {
                        ".exit" | ".quit" => {
                            println!("Bye!");
                            break;
                        }
                        ".help" => {
                            println!("Commands:");
                            println!("  .exit, .quit  Exit the REPL");
                            println!("  .help         Show this help message");
                            println!("  .show         Print the statement and its parameters");
                            println!("  .reset        Start a new statement");
                            println!("  <json>        Append a clause payload (object or array)");
                        }
                        ".show" => match session.builder.compile() {
                            Ok(compiled) => {
                                let mut stdout = std::io::stdout().lock();
                                write_compiled(&mut stdout, &compiled, OutputFormat::Pretty)?;
                            }
                            Err(e) => println!("Error: {e}"),
                        },
                        ".reset" => {
                            session.reset();
                            println!("(empty statement)");
                        }
                        _ => println!("Unknown command: {}", line),
                    }
                    continue;
                }

                let start = Instant::now();
                match session.add(line) {
                    Ok(statement) => {
                        println!("{statement}");
                        println!("({:.4}s)", start.elapsed().as_secs_f64());
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
