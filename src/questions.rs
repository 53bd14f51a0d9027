//! The interactive question flow that produces generation [`Options`].

use log::debug;
use std::path::Path;

use crate::error::{Error, Result};
use crate::options::{
    sanitize_name, Architecture, Mechanism, Options, Strategy, StyleEngine, ViewEngine,
};
use crate::prompt::Prompter;
use crate::utils::is_directory_empty;

/// Experience level; decides which questions are asked and their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Beginner = 1,
    Medium = 2,
    Advanced = 3,
}

const LEVELS: [(&str, Level); 3] =
    [("Beginner", Level::Beginner), ("Medium", Level::Medium), ("Advanced", Level::Advanced)];

/// Asks every question needed to generate a project inside `cwd`.
///
/// # Errors
/// * `Error::ValidationError` if the sanitized name is empty
/// * `Error::UserDeclinedOverwrite` as soon as the user refuses to replace an existing directory
/// * `Error::PromptError` if the terminal interaction fails
pub fn ask_questions(prompter: &dyn Prompter, cwd: &Path) -> Result<Options> {
    let name = sanitize_name(&prompter.input("App name:", "app")?);
    if name.is_empty() {
        return Err(Error::ValidationError("generated app should have a name".into()));
    }
    let mut options = Options::new(name.clone(), cwd.join(&name));

    if !is_directory_empty(&options.directory)? {
        let replace = prompter.confirm(
            "There's already a folder with that name. Should ironmaker replace it?",
            false,
        )?;
        if !replace {
            return Err(Error::UserDeclinedOverwrite);
        }
        options.overwrite = Some(true);
    }

    let labels: Vec<&str> = LEVELS.iter().map(|(label, _)| *label).collect();
    let level = LEVELS
        .get(prompter.select("Level:", &labels, 0)?)
        .map_or(Level::Beginner, |(_, level)| *level);
    debug!("Selected level {:?}.", level);

    if level >= Level::Advanced {
        let choice = prompter.select("Architecture:", &["MVC Pattern", "REST API"], 0)?;
        options.architecture = if choice == 1 { Architecture::Api } else { Architecture::Mvc };
    }

    if options.is_mvc() && level >= Level::Medium {
        let engines = [None, Some(ViewEngine::Hbs), Some(ViewEngine::Pug)];
        let choice = prompter.select(
            "Templating Engine:",
            &["None (static HTML)", "Handlebars", "Pug"],
            1,
        )?;
        options.template = engines.get(choice).copied().flatten();

        let choice = prompter.select("Style Preprocessor:", &["None (static CSS)", "SCSS"], 1)?;
        options.style = if choice == 1 { Some(StyleEngine::Scss) } else { None };
    }

    if level >= Level::Medium {
        options.database = prompter.confirm("Use MongoDB:", true)?;
    }

    if level >= Level::Advanced && options.database {
        options.authentication.enabled = prompter.confirm("Include Authentication:", true)?;
    }

    if options.authentication.enabled {
        let choice = prompter.select(
            "Authentication Mechanism:",
            &["Basic Session and Cookie", "Passport"],
            0,
        )?;
        options.authentication.mechanism = (choice == 1).then_some(Mechanism::Passport);
    }

    if options.authentication.is_passport() {
        let labels: Vec<&str> = Strategy::ALL.iter().map(Strategy::label).collect();
        let defaults: Vec<bool> = Strategy::ALL.iter().map(|s| *s == Strategy::Local).collect();
        let chosen = prompter.multi_select("Strategies:", &labels, &defaults)?;
        options.authentication.strategies =
            chosen.into_iter().filter_map(|index| Strategy::ALL.get(index).copied()).collect();
    }

    if level >= Level::Advanced {
        options.strict = prompter.confirm("Enable Strict Mode:", true)?;
    }

    if level >= Level::Medium {
        options.linting = prompter.confirm("Lint code with ESLint:", true)?;
    }

    Ok(options)
}
