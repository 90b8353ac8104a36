//! Numbered-menu interactive mode.
//!
//! # Responsibility
//! - Translate each menu choice into exactly one service call.
//! - Report store errors to the user and keep the loop running.
//!
//! # Invariants
//! - Only I/O failures on the terminal end the loop with an error.
//! - End of input behaves like quitting.

use minicrm_core::{Contact, ContactId, ContactService, ContactStore};
use std::io::{self, BufRead, Write};

const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";

/// Runs the menu loop until the user quits or input is exhausted.
pub fn run_interactive<S, R, W>(
    service: &ContactService<S>,
    input: &mut R,
    output: &mut W,
) -> io::Result<()>
where
    S: ContactStore,
    R: BufRead,
    W: Write,
{
    loop {
        write_menu(output)?;
        let Some(choice) = prompt(input, output, "Choose an option: ")? else {
            return Ok(());
        };

        match choice.as_str() {
            "1" => {
                if !handle_add(service, input, output)? {
                    return Ok(());
                }
            }
            "2" => write_contacts(output, service)?,
            "3" => {
                if !handle_remove(service, input, output)? {
                    return Ok(());
                }
            }
            "4" => {
                if !handle_update(service, input, output)? {
                    return Ok(());
                }
            }
            "5" => {
                writeln!(output, "It was a pleasure!")?;
                return Ok(());
            }
            "q" => {
                writeln!(output, "Leaving just like that?")?;
                return Ok(());
            }
            "c" => write!(output, "{CLEAR_SCREEN}")?,
            _ => writeln!(output, "Invalid option :(")?,
        }
    }
}

/// Prints contacts ordered by id, reporting store errors inline.
fn write_contacts<S, W>(output: &mut W, service: &ContactService<S>) -> io::Result<()>
where
    S: ContactStore,
    W: Write,
{
    match service.list_contacts() {
        Ok(contacts) => print_contacts(output, &contacts),
        Err(err) => writeln!(output, "Error while listing contacts: {err}"),
    }
}

/// Prints `contacts` in order, or a placeholder line when empty.
pub fn print_contacts<W: Write>(output: &mut W, contacts: &[Contact]) -> io::Result<()> {
    if contacts.is_empty() {
        return writeln!(output, "\nNo contacts recorded");
    }
    writeln!(output, "\n--- Contact list ---")?;
    contacts
        .iter()
        .try_for_each(|contact| writeln!(output, "{contact}"))
}

fn write_menu<W: Write>(output: &mut W) -> io::Result<()> {
    writeln!(output, "\n--- [mini-CRM] ---")?;
    writeln!(output, "1. Add a contact")?;
    writeln!(output, "2. List all contacts")?;
    writeln!(output, "3. Remove a contact")?;
    writeln!(output, "4. Update a contact")?;
    writeln!(output, "5. Quit")
}

// Each handler returns Ok(false) when input ended mid-dialog.

fn handle_add<S, R, W>(
    service: &ContactService<S>,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool>
where
    S: ContactStore,
    R: BufRead,
    W: Write,
{
    let Some(name) = prompt(input, output, "\nName: ")? else {
        return Ok(false);
    };
    let Some(email) = prompt(input, output, "Email: ")? else {
        return Ok(false);
    };

    match service.add_contact(name, email) {
        Ok(contact) => writeln!(output, "Contact added successfully: {contact}")?,
        Err(err) => writeln!(output, "Error while adding contact: {err}")?,
    }
    Ok(true)
}

fn handle_remove<S, R, W>(
    service: &ContactService<S>,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool>
where
    S: ContactStore,
    R: BufRead,
    W: Write,
{
    let Some(id) = prompt_id(input, output, "Id of the contact to remove: ")? else {
        return Ok(false);
    };
    let Some(id) = id else {
        return Ok(true);
    };

    match service.remove_contact(id) {
        Ok(()) => writeln!(output, "Contact removed successfully")?,
        Err(err) => writeln!(output, "Error: {err}")?,
    }
    Ok(true)
}

fn handle_update<S, R, W>(
    service: &ContactService<S>,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool>
where
    S: ContactStore,
    R: BufRead,
    W: Write,
{
    let Some(id) = prompt_id(input, output, "Id of the contact to update: ")? else {
        return Ok(false);
    };
    let Some(id) = id else {
        return Ok(true);
    };

    let current: Contact = match service.get_contact(id) {
        Ok(Some(contact)) => contact,
        Ok(None) => {
            writeln!(output, "Contact not found")?;
            return Ok(true);
        }
        Err(err) => {
            writeln!(output, "Error: {err}")?;
            return Ok(true);
        }
    };

    let Some(name) = prompt(
        input,
        output,
        &format!(
            "Current name: {}\nNew name (leave empty to keep): ",
            current.name
        ),
    )?
    else {
        return Ok(false);
    };
    let Some(email) = prompt(
        input,
        output,
        &format!(
            "Current email: {}\nNew email (leave empty to keep): ",
            current.email
        ),
    )?
    else {
        return Ok(false);
    };

    match service.update_contact(id, &name, &email) {
        Ok(()) => writeln!(output, "Contact updated successfully")?,
        Err(err) => writeln!(output, "Error while updating contact: {err}")?,
    }
    Ok(true)
}

/// Reads an id. Outer `None` means end of input; inner `None` means the
/// value was rejected and already reported.
fn prompt_id<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> io::Result<Option<Option<ContactId>>> {
    let Some(raw) = prompt(input, output, message)? else {
        return Ok(None);
    };
    match raw.parse::<ContactId>() {
        Ok(id) if id > 0 => Ok(Some(Some(id))),
        _ => {
            writeln!(output, "Invalid id")?;
            Ok(Some(None))
        }
    }
}

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> io::Result<Option<String>> {
    write!(output, "{message}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
