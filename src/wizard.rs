//! Interactive terminal frontend.
//!
//! Renders one screen per loop pass, translates keystrokes into intents,
//! and carries out the effects the controller hands back. Flow rules all
//! live in the controller; this module only reads lines and prints.

use crate::controller::{Effect, FlowController, Intent};
use crate::flow::{ContactDef, LandingDef, Screen};
use crate::record::LeadRecord;
use crate::store::SessionStore;
use crate::sync::LeadGateway;
use anyhow::{Context, Result};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// What one screen visit asked for.
enum Visit {
    Intents(Vec<Intent>),
    Quit,
}

pub fn run_session<S: SessionStore, G: LeadGateway>(
    mut controller: FlowController<S, G>,
) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    run_with_input(&mut controller, &mut input)
}

fn run_with_input<S: SessionStore, G: LeadGateway>(
    controller: &mut FlowController<S, G>,
    input: &mut impl BufRead,
) -> Result<()> {
    loop {
        let visit = render_and_prompt(controller, input)?;
        let intents = match visit {
            Visit::Quit => {
                println!("progress saved; resume with `leadwiz run`.");
                return Ok(());
            }
            Visit::Intents(intents) => intents,
        };
        for intent in intents {
            let submits = controller.will_submit(&intent);
            if submits {
                println!("saving...");
            }
            match controller.apply(intent) {
                Ok(effects) => {
                    if submits {
                        match controller.record().lead_id() {
                            Some(id) => println!("saved (lead {id})"),
                            None => println!("saved"),
                        }
                    }
                    for effect in effects {
                        perform(effect);
                    }
                }
                Err(err) => {
                    println!("! {err}");
                    break;
                }
            }
        }
    }
}

fn render_and_prompt<S: SessionStore, G: LeadGateway>(
    controller: &FlowController<S, G>,
    input: &mut impl BufRead,
) -> Result<Visit> {
    let step = controller.display_step();
    let last = controller.plan().last_step();
    println!();
    match controller.screen() {
        Screen::Landing(def) => {
            println!("[{step}/{last}] {}", def.title);
            visit_landing(def, input)
        }
        Screen::Contact(def) => {
            println!("[{step}/{last}] {}", def.title);
            visit_contact(controller.record(), def, input)
        }
        Screen::RoleSelect(def) => {
            println!(
                "[{step}/{last}] {}, {}",
                controller.record().first_name(),
                def.title
            );
            let options: Vec<(&str, &str)> = def
                .options
                .iter()
                .map(|option| (option.label.as_str(), option.role.as_str()))
                .collect();
            visit_pick(&options, input)
        }
        Screen::Question(question) => {
            println!("[{step}/{last}] {}", question.title);
            let options: Vec<(&str, &str)> = question
                .options
                .iter()
                .map(|option| (option.as_str(), option.as_str()))
                .collect();
            visit_pick(&options, input)
        }
        Screen::ThankYou(def) => {
            println!(
                "[{step}/{last}] {}, {}!",
                def.title,
                controller.record().first_name()
            );
            println!("{}", def.blurb);
            println!("{}", def.tagline);
            visit_thank_you(input)
        }
    }
}

fn visit_landing(def: &LandingDef, input: &mut impl BufRead) -> Result<Visit> {
    println!("{}", def.blurb);
    let prompt = format!("press Enter to {} (q to quit): ", def.cta.to_lowercase());
    match read_line(input, &prompt)? {
        None => Ok(Visit::Quit),
        Some(answer) if answer.eq_ignore_ascii_case("q") => Ok(Visit::Quit),
        Some(_) => Ok(Visit::Intents(vec![Intent::Continue])),
    }
}

fn visit_contact(
    record: &LeadRecord,
    def: &ContactDef,
    input: &mut impl BufRead,
) -> Result<Visit> {
    let mut intents = Vec::new();
    for field in &def.fields {
        println!("{}", field.hint);
        let current = record.text(&field.key).unwrap_or("");
        let prompt = if current.is_empty() {
            format!("{}: ", field.label)
        } else {
            format!("{} [{current}]: ", field.label)
        };
        match read_line(input, &prompt)? {
            None => return Ok(Visit::Quit),
            // Enter keeps the value already on file
            Some(value) if value.is_empty() => {}
            Some(value) => intents.push(Intent::Edit {
                key: field.key.clone(),
                value,
            }),
        }
    }
    match read_line(input, "save and continue? [Y/b=back/q=quit]: ")? {
        None => Ok(Visit::Quit),
        Some(answer) if answer.eq_ignore_ascii_case("q") => Ok(Visit::Quit),
        Some(answer) if answer.eq_ignore_ascii_case("b") => {
            intents.push(Intent::Back);
            Ok(Visit::Intents(intents))
        }
        Some(_) => {
            intents.push(Intent::Continue);
            Ok(Visit::Intents(intents))
        }
    }
}

fn visit_pick(options: &[(&str, &str)], input: &mut impl BufRead) -> Result<Visit> {
    for (index, (label, _)) in options.iter().enumerate() {
        println!("  {}) {label}", index + 1);
    }
    let prompt = format!("choose 1-{} (b=back, q=quit): ", options.len());
    loop {
        match read_line(input, &prompt)? {
            None => return Ok(Visit::Quit),
            Some(answer) if answer.eq_ignore_ascii_case("q") => return Ok(Visit::Quit),
            Some(answer) if answer.eq_ignore_ascii_case("b") => {
                return Ok(Visit::Intents(vec![Intent::Back]));
            }
            Some(answer) => match answer.parse::<usize>() {
                Ok(choice) if (1..=options.len()).contains(&choice) => {
                    return Ok(Visit::Intents(vec![Intent::Pick {
                        value: options[choice - 1].1.to_string(),
                    }]));
                }
                _ => println!("! pick a number between 1 and {}", options.len()),
            },
        }
    }
}

fn visit_thank_you(input: &mut impl BufRead) -> Result<Visit> {
    loop {
        let prompt = "[d] download brochure / [w] continue on WhatsApp / [r] start over / [q] quit: ";
        match read_line(input, prompt)? {
            None => return Ok(Visit::Quit),
            Some(answer) => match answer.to_ascii_lowercase().as_str() {
                "q" | "" => return Ok(Visit::Quit),
                "d" => return Ok(Visit::Intents(vec![Intent::DownloadBrochure])),
                "w" => return Ok(Visit::Intents(vec![Intent::WhatsAppHandoff])),
                "r" => return Ok(Visit::Intents(vec![Intent::Restart])),
                _ => println!("! choose d, w, r, or q"),
            },
        }
    }
}

fn perform(effect: Effect) {
    match effect {
        Effect::SaveBrochure { source, filename } => {
            match fs::copy(&source, Path::new(&filename)) {
                Ok(_) => println!("brochure saved to {filename}"),
                Err(err) => println!(
                    "! could not save brochure from {}: {err}",
                    source.display()
                ),
            }
        }
        Effect::OpenUrl { url } => {
            println!("open this link to continue on WhatsApp:");
            println!("  {url}");
        }
    }
}

/// One trimmed line; `None` once input is exhausted.
fn read_line(input: &mut impl BufRead, prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush().context("flush prompt")?;
    let mut line = String::new();
    let read = input.read_line(&mut line).context("read input")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
