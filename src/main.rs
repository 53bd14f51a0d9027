//! ironmaker's main application entry point.
//! Gathers options interactively or from an answers file, generates the project
//! and prints the next steps.

use std::path::{Path, PathBuf};

use ironmaker::{
    cli::{get_args, Args},
    config::options_from_file,
    constants::DEFAULT_TEMPLATE_DIR,
    error::{default_error_handler, Error, Result},
    generator::generate,
    logger::init_logger,
    options::Options,
    progress::ConsoleSink,
    prompt::DialoguerPrompter,
    questions::ask_questions,
    renderer::Templates,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

fn print_next_steps(options: &Options, cwd: &Path) {
    let prompt = if cfg!(windows) { ">" } else { "$" };

    if options.directory != cwd {
        let directory = options.directory.strip_prefix(cwd).unwrap_or(&options.directory);
        println!();
        println!("   change directory:");
        println!("     {} cd {}", prompt, directory.display());
    }

    println!();
    println!("   install dependencies:");
    println!("     {} npm install", prompt);
    println!();
    println!("   run the app:");
    if cfg!(windows) {
        println!("     {} SET DEBUG={}:* & npm run dev", prompt, options.name);
    } else {
        println!("     {} DEBUG={}:* npm run dev", prompt, options.name);
    }
    println!();
}

/// Main application logic execution.
///
/// # Flow
/// 1. Collects options from the answers file or the interactive questions
/// 2. Loads the template set
/// 3. Generates the project
/// 4. Prints how to install and start it
fn run(args: Args) -> Result<()> {
    let cwd = std::env::current_dir().map_err(Error::IoError)?;

    let mut options = match &args.answers {
        Some(path) => options_from_file(path, &cwd, args.force)?,
        None => {
            println!("Welcome to the ironmaker generator!");
            println!();
            ask_questions(&DialoguerPrompter::new(), &cwd)?
        }
    };
    options.verbose |= args.verbose;

    let template_root = args.templates.unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATE_DIR));
    let templates = Templates::new(template_root);
    let sink = ConsoleSink::new(options.verbose);

    println!();
    generate(&options, &templates, &sink)?;
    print_next_steps(&options, &cwd);
    Ok(())
}
