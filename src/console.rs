//! Interactive text menu over a [`Catalog`].
//!
//! The console reads one line per prompt, so it can be driven by a terminal
//! or by any other [`BufRead`].

use std::{
    io::{self, BufRead, Write},
    path::Path,
};

use colored::Colorize;
use tracing::debug;

use crate::{
    book_status::BookStatus,
    catalog::Catalog,
    error::CatalogError,
    record::{Book, BookId},
};

/// Actions offered by the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    /// Add a book
    Add,
    /// Delete a book by id
    Delete,
    /// Search by title, author or year
    Search,
    /// Show every book
    List,
    /// Change the status of a book
    ChangeStatus,
    /// Save and leave
    Exit,
}

impl MenuAction {
    /// Every action with its menu label, in menu order
    const ENTRIES: [(Self, &'static str); 6] = [
        (Self::Add, "Add a book"),
        (Self::Delete, "Delete a book"),
        (Self::Search, "Search books"),
        (Self::List, "List all books"),
        (Self::ChangeStatus, "Change book status"),
        (Self::Exit, "Exit"),
    ];

    /// Map a menu choice such as `"3"` to its action
    fn parse(choice: &str) -> Option<Self> {
        let index = choice.trim().parse::<usize>().ok()?.checked_sub(1)?;
        Self::ENTRIES.get(index).map(|(action, _)| *action)
    }
}

/// Menu-driven console session
#[derive(Debug)]
pub struct Console<R, W> {
    /// Where answers are read from
    input: R,
    /// Where prompts and results go
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Create a console over the given input and output
    #[must_use]
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the output, mostly useful to inspect what was written
    #[must_use]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Tell the operator about problems met while loading the catalog
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output fails
    pub fn report_load_issues(&mut self, issues: &[CatalogError]) -> io::Result<()> {
        for issue in issues {
            writeln!(self.output, "{} {issue}", "Warning:".yellow().bold())?;
            if matches!(issue, CatalogError::CorruptStore { .. }) {
                writeln!(self.output, "The file will be overwritten on the next save.")?;
            }
        }
        Ok(())
    }

    /// Run the menu until the user exits or input ends, then save to `store`
    ///
    /// A failed save is reported on the output, not returned.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails
    pub fn run(&mut self, catalog: &mut Catalog, store: &Path) -> io::Result<()> {
        loop {
            self.print_menu()?;
            let Some(choice) = self.prompt("Choose an action: ")? else {
                break;
            };

            match MenuAction::parse(&choice) {
                Some(MenuAction::Add) => self.add_book(catalog)?,
                Some(MenuAction::Delete) => self.delete_book(catalog)?,
                Some(MenuAction::Search) => self.search_books(catalog)?,
                Some(MenuAction::List) => self.list_books(catalog)?,
                Some(MenuAction::ChangeStatus) => self.change_status(catalog)?,
                Some(MenuAction::Exit) => break,
                None => writeln!(self.output, "{}", "Invalid choice, try again.".red())?,
            }
        }

        match catalog.save(store) {
            Ok(()) => writeln!(self.output, "{}", "Catalog saved. Goodbye!".green()),
            Err(e) => writeln!(self.output, "{} {e}", "Error:".red().bold()),
        }
    }

    /// Print the main menu
    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n{}", "Menu:".bold())?;
        for (number, (_, label)) in (1_usize..).zip(MenuAction::ENTRIES) {
            writeln!(self.output, "{number}. {label}")?;
        }
        Ok(())
    }

    /// Show `message` and read one line
    ///
    /// Returns `None` once input is exhausted.
    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.output, "{message}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            debug!("console input closed");
            return Ok(None);
        }
        let answer = line.trim_end_matches(['\n', '\r']).to_string();
        Ok(Some(answer))
    }

    /// Print one book as a block of lines
    fn print_book(&mut self, book: &Book) -> io::Result<()> {
        writeln!(self.output, "ID: {}", book.id())?;
        writeln!(self.output, "Title: {}", book.title())?;
        writeln!(self.output, "Author: {}", book.author())?;
        writeln!(self.output, "Year: {}", book.year())?;
        writeln!(self.output, "Status: {}", book.status())?;
        writeln!(self.output)
    }

    /// Ask for the fields of a new book and add it
    fn add_book(&mut self, catalog: &mut Catalog) -> io::Result<()> {
        let Some(title) = self.prompt("Enter the title: ")? else { return Ok(()) };
        let Some(author) = self.prompt("Enter the author: ")? else { return Ok(()) };
        let Some(year) = self.prompt("Enter the publication year: ")? else { return Ok(()) };

        match catalog.add(title, author, year) {
            Ok(book) => {
                writeln!(self.output, "{} New book id: {}", "Book added.".green(), book.id())
            }
            Err(e) => writeln!(self.output, "{}", e.to_string().red()),
        }
    }

    /// Ask for an id and delete that book
    fn delete_book(&mut self, catalog: &mut Catalog) -> io::Result<()> {
        let Some(answer) = self.prompt("Enter the id of the book to delete: ")? else {
            return Ok(());
        };
        let Ok(id) = answer.parse::<BookId>() else {
            return writeln!(self.output, "{}", "The id must be a number.".red());
        };

        match catalog.delete(id) {
            Ok(book) => writeln!(self.output, "{} \"{}\"", "Deleted".green(), book.title()),
            Err(e) => writeln!(self.output, "{}", e.to_string().red()),
        }
    }

    /// Ask for a query and show the matching books
    fn search_books(&mut self, catalog: &Catalog) -> io::Result<()> {
        let Some(query) = self.prompt("Enter a title, author or year: ")? else {
            return Ok(());
        };

        let found: Vec<&Book> = catalog.find(&query).collect();
        if found.is_empty() {
            return writeln!(self.output, "No books found.");
        }

        writeln!(self.output, "{}\n", "Found books:".bold())?;
        for book in found {
            self.print_book(book)?;
        }
        Ok(())
    }

    /// Show every book in the catalog
    fn list_books(&mut self, catalog: &Catalog) -> io::Result<()> {
        if catalog.is_empty() {
            return writeln!(self.output, "The catalog is empty.");
        }

        writeln!(self.output, "{} ({catalog})\n", "Books:".bold())?;
        for book in catalog.list() {
            self.print_book(book)?;
        }
        Ok(())
    }

    /// Ask for an id, then a status, re-asking until both are valid
    ///
    /// An empty answer at either step returns to the menu.
    fn change_status(&mut self, catalog: &mut Catalog) -> io::Result<()> {
        let id = loop {
            let Some(answer) =
                self.prompt("Enter the id of the book (empty line to go back): ")?
            else {
                return Ok(());
            };
            if answer.trim().is_empty() {
                return writeln!(self.output, "Back to the menu.");
            }
            match answer.parse::<BookId>() {
                Ok(id) if catalog.get(id).is_some() => break id,
                Ok(id) => {
                    let missing = CatalogError::NotFound(id).to_string();
                    writeln!(self.output, "{}", missing.red())?;
                }
                Err(_) => writeln!(self.output, "{}", "The id must be a number.".red())?,
            }
        };

        let choices = BookStatus::ALL.map(BookStatus::as_str).join("/");
        let message = format!("Enter the new status ({choices}, empty line to go back): ");
        loop {
            let Some(answer) = self.prompt(&message)? else { return Ok(()) };
            if answer.trim().is_empty() {
                return writeln!(self.output, "Back to the menu.");
            }
            match catalog.change_status(id, &answer) {
                Ok(book) => {
                    let description = book.status().get_description();
                    return writeln!(self.output, "{} {description}.", "Status changed.".green());
                }
                Err(e) => writeln!(self.output, "{}", e.to_string().red())?,
            }
        }
    }
}
