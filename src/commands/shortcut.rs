//! `scripter shortcut` commands.

use crate::cli::ShortcutCommand;
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::runner::split_commands;
use crate::store::{NewShortcut, Shortcut, ShortcutStore};

/// Execute a `shortcut` subcommand.
///
/// # Errors
///
/// Returns an error string if the store cannot be read or written, or the
/// named shortcut does not exist.
pub fn run(ctx: &ServiceContext, settings: &Settings, command: &ShortcutCommand) -> Result<(), String> {
    let store = ShortcutStore::new(ctx, &settings.shortcuts_path);

    match command {
        ShortcutCommand::Save { name, description, commands, file, cwd } => {
            let commands = match (commands, file) {
                (Some(commands), _) => commands.clone(),
                (None, Some(path)) => ctx
                    .fs
                    .read_to_string(path)
                    .map_err(|e| format!("Failed to read {}: {e}", path.display()))?,
                (None, None) => return Err("Pass --commands or --file".to_string()),
            };
            let saved = store.save(NewShortcut {
                name: name.clone(),
                description: description.clone(),
                commands,
                working_dir: cwd.clone(),
            })?;
            println!("Saved shortcut {} ({})", saved.name, saved.id);
            Ok(())
        }
        ShortcutCommand::List => {
            let shortcuts = store.list();
            if shortcuts.is_empty() {
                println!("No shortcuts saved.");
            } else {
                for shortcut in &shortcuts {
                    println!("{}", summary_line(shortcut));
                }
            }
            Ok(())
        }
        ShortcutCommand::Show { key } => {
            let shortcut = store.find(key)?.ok_or_else(|| format!("Shortcut not found: {key}"))?;
            print_shortcut(&shortcut);
            Ok(())
        }
        ShortcutCommand::Delete { id } => {
            if store.delete(id)? {
                println!("Deleted shortcut {id}");
                Ok(())
            } else {
                Err(format!("Shortcut not found: {id}"))
            }
        }
    }
}

fn summary_line(shortcut: &Shortcut) -> String {
    let count = split_commands(&shortcut.commands).len();
    let noun = if count == 1 { "command" } else { "commands" };
    format!("{}  {}  ({count} {noun})", shortcut.id, shortcut.name)
}

fn print_shortcut(shortcut: &Shortcut) {
    println!("Id: {}", shortcut.id);
    println!("Name: {}", shortcut.name);
    if !shortcut.description.is_empty() {
        println!("Description: {}", shortcut.description);
    }
    if let Some(dir) = &shortcut.working_dir {
        println!("Working dir: {}", dir.display());
    }
    println!("Created: {}", shortcut.created_at.to_rfc3339());
    println!("\nCommands:");
    for line in split_commands(&shortcut.commands) {
        println!("  {line}");
    }
}
