//! Project generation.
//!
//! Decides which files an option set produces, queues them on a [`FileProcessor`]
//! and executes the queue once. Also assembles the package manifest.

use log::{debug, warn};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::{
    data::TemplateData,
    error::{Error, Result},
    manifest::PackageManifest,
    options::{Options, StyleEngine},
    processor::{FileProcessor, Operation},
    progress::ProgressSink,
    renderer::Templates,
    utils::{
        contains_working_directory, delete_directory_recursive, ensure_directory,
        is_directory_empty, read_file,
    },
};

/// Base manifest inside the template set
pub const MANIFEST_TEMPLATE: &str = "package.json";

#[derive(Debug, Serialize)]
struct ViewLocals {
    engine: &'static str,
}

#[derive(Debug, Serialize)]
struct RouterLocals {
    name: &'static str,
    location: &'static str,
    path: &'static str,
}

/// Data only `app.js` needs: what it requires, registers and mounts.
#[derive(Debug, Default, Serialize)]
struct AppLocals {
    local_modules: BTreeMap<&'static str, &'static str>,
    modules: BTreeMap<&'static str, &'static str>,
    uses: Vec<String>,
    view: Option<ViewLocals>,
    routers: Vec<RouterLocals>,
}

/// Base template data shared by every rendered file.
pub fn template_data(options: &Options) -> Result<TemplateData> {
    TemplateData::from_serialize(&json!({
        "name": options.name,
        "architecture": options.architecture,
        "template": options.template,
        "style": options.style,
        "database": options.database,
        "authentication": options.authentication,
        "strict": options.strict,
        "linting": options.linting,
    }))
}

/// Makes sure the destination root exists and is safe to write into.
///
/// A non-empty destination is deleted only when `options.overwrite` is `Some(true)`.
/// Emptiness is checked right before deleting, so a directory emptied since the
/// question was asked is left alone.
///
/// # Errors
/// * `Error::UserDeclinedOverwrite` if replacing the destination was declined
/// * `Error::ValidationError` if the destination is the working directory or one of its ancestors
/// * `Error::OutputDirectoryExistsError` if the destination is not empty and no decision was made
/// * `Error::FilesystemError` if the destination cannot be removed or created
pub fn prepare_destination(options: &Options, sink: &dyn ProgressSink) -> Result<()> {
    let directory = &options.directory;
    if !is_directory_empty(directory)? {
        match options.overwrite {
            Some(true) => {
                let cwd = std::env::current_dir().map_err(Error::IoError)?;
                if contains_working_directory(directory, &cwd) {
                    return Err(Error::ValidationError(format!(
                        "refusing to replace '{}', it contains the working directory",
                        directory.display()
                    )));
                }
                debug!("Replacing existing directory '{}'.", directory.display());
                delete_directory_recursive(directory)?;
            }
            Some(false) => return Err(Error::UserDeclinedOverwrite),
            None => {
                return Err(Error::OutputDirectoryExistsError {
                    output_dir: directory.display().to_string(),
                })
            }
        }
    }
    ensure_directory(directory, sink)?;
    Ok(())
}

/// Generates the project described by `options`.
///
/// # Returns
/// * `Result<Vec<PathBuf>>` - Every file written, in the order it was written
pub fn generate(
    options: &Options,
    templates: &Templates,
    sink: &dyn ProgressSink,
) -> Result<Vec<PathBuf>> {
    options.validate()?;
    if options.authentication.enabled && !options.database {
        warn!(
            "Authentication is enabled without a database; the generated code requires \
             'models/user.js', which is only created with a database."
        );
    }
    prepare_destination(options, sink)?;

    let mut processor =
        FileProcessor::new(templates, &options.directory, template_data(options)?, sink);
    let mut manifest = base_manifest(options, templates)?;
    let mut app = AppLocals::default();

    // Favicon
    app.modules.insert("serveFavicon", "serve-favicon");
    app.uses.push("serveFavicon(path.join(__dirname, 'public/images', 'favicon.ico'))".into());
    manifest.add_dependency("serve-favicon", "^2.5.0");

    if options.is_mvc() {
        enqueue_mvc(&mut processor, options, &mut manifest, &mut app)?;
    }

    processor.copy_multiple("public/images", "public/images", None)?;

    // Logging
    app.modules.insert("logger", "morgan");
    app.uses.push("logger('dev')".into());
    manifest.add_dependency("morgan", "^1.10.0");

    // Body parsing
    if options.is_api() {
        app.modules.insert("cors", "cors");
        app.uses.push(CORS_USE.into());
        app.uses.push("express.json()".into());
        manifest.add_dependency("cors", "^2.8.5");
    } else {
        app.uses.push("express.urlencoded({ extended: true })".into());
    }

    if options.authentication.enabled {
        app.modules.insert("expressSession", "express-session");
        app.modules.insert("connectMongo", "connect-mongo");
        app.uses.push(session_use(options));
        manifest.add_dependency("express-session", "^1.17.3");
        manifest.add_dependency("connect-mongo", "^4.6.0");
        manifest.add_dependency("bcryptjs", "^2.4.3");
    }

    processor.render("routes/base.js", "routes/base.js", TemplateData::new())?;
    app.routers.push(RouterLocals { name: "baseRouter", location: "./routes/base", path: "/" });

    enqueue_authentication(&mut processor, options, &mut manifest, &mut app)?;

    processor.copy("gitignore", ".gitignore")?;

    if options.linting {
        for (name, version) in LINT_DEV_DEPENDENCIES {
            manifest.add_dev_dependency(name, version);
        }
        for file in [".eslintrc.json", ".eslintignore", ".prettierrc.json"] {
            processor.copy(file, file)?;
        }
    }

    if options.database {
        processor.render("models/user.js", "models/user.js", TemplateData::new())?;
    }

    processor.write(MANIFEST_TEMPLATE, manifest.to_json()?)?;
    processor.render("app.js", "app.js", TemplateData::from_serialize(&app)?)?;
    processor.enqueue(
        Operation::render("server.js", "server.js")
            .with_data(TemplateData::from_serialize(&json!({ "name": options.name }))?)
            .executable(),
    )?;
    processor.render(".env", ".env", TemplateData::new())?;

    let written = processor.execute()?;
    debug!("Generated {} files in '{}'.", written.len(), options.directory.display());
    Ok(written)
}

const CORS_USE: &str = "cors({
  ...(process.env.CLIENT_APP_ORIGINS && { origin: process.env.CLIENT_APP_ORIGINS.split(',') }),
  credentials: true
})";

const SASS_USE: &str = "sassMiddleware({
  src: path.join(__dirname, 'styles'),
  dest: path.join(__dirname, 'public/styles'),
  prefix: '/styles',
  outputStyle: process.env.NODE_ENV === 'development' ? 'expanded' : 'compressed',
  force: process.env.NODE_ENV === 'development',
  sourceMap: process.env.NODE_ENV === 'development'
})";

const LINT_DEV_DEPENDENCIES: [(&str, &str); 7] = [
    ("eslint", "^8.25.0"),
    ("eslint-config-prettier", "^8.5.0"),
    ("eslint-plugin-import", "^2.26.0"),
    ("eslint-plugin-node", "^11.1.0"),
    ("eslint-plugin-prettier", "^4.2.1"),
    ("eslint-plugin-promise", "^6.0.1"),
    ("prettier", "^2.7.1"),
];

fn session_use(options: &Options) -> String {
    let cookie = if options.is_api() {
        "httpOnly: true,
    sameSite: process.env.NODE_ENV === 'production' ? 'none' : false,
    secure: process.env.NODE_ENV === 'production'"
    } else {
        "httpOnly: true"
    };
    format!(
        "expressSession({{
  secret: process.env.SESSION_SECRET,
  resave: true,
  saveUninitialized: false,
  proxy: true,
  cookie: {{
    maxAge: 15 * 24 * 60 * 60 * 1000,
    {cookie}
  }},
  store: connectMongo.create({{
    mongoUrl: process.env.MONGODB_URI,
    ttl: 60 * 60
  }})
}})"
    )
}

fn base_manifest(options: &Options, templates: &Templates) -> Result<PackageManifest> {
    let base = read_file(templates.root(), MANIFEST_TEMPLATE).map_err(|err| match err {
        Error::FileNotFound { .. } => Error::TemplateNotFound { name: MANIFEST_TEMPLATE.into() },
        other => other,
    })?;
    let mut manifest = PackageManifest::from_base(&options.name, &base)?;
    manifest.add_script("dev:debug", format!("DEBUG={}* npm run dev", options.name));
    if options.linting {
        manifest.add_script("lint", "eslint .");
    }
    if options.database {
        manifest.add_dependency("mongoose", "^6.6.5");
    }
    Ok(manifest)
}

fn enqueue_mvc(
    processor: &mut FileProcessor<'_>,
    options: &Options,
    manifest: &mut PackageManifest,
    app: &mut AppLocals,
) -> Result<()> {
    processor.copy_multiple("public/scripts", "public/scripts", None)?;

    match options.template {
        Some(engine) => {
            let ext = engine.extension();
            manifest.add_dependency(ext, engine.version());
            processor.copy_multiple("views", "views", Some(format!("*.{ext}").as_str()))?;
            app.view = Some(ViewLocals { engine: ext });

            let mut views = vec!["layout"];
            if options.authentication.enabled {
                views.extend(["sign-in", "sign-up"]);
            }
            for view in views {
                let name = format!("views/{view}.{ext}");
                processor.render(name.clone(), name, TemplateData::new())?;
            }
        }
        // Static pages are served straight from the public directory.
        None => processor.copy_multiple("views", "public", Some("*.html"))?,
    }

    match options.style {
        Some(StyleEngine::Scss) => {
            app.modules.insert("sassMiddleware", "node-sass-middleware");
            app.uses.push(SASS_USE.into());
            manifest.add_dependency("node-sass-middleware", "^1.0.1");
            processor.copy_multiple("styles", "styles", Some("*.scss"))?;
        }
        None => processor.copy_multiple("styles", "public/styles", Some("*.css"))?,
    }

    app.uses.push("express.static(path.join(__dirname, 'public'))".into());
    Ok(())
}

fn enqueue_authentication(
    processor: &mut FileProcessor<'_>,
    options: &Options,
    manifest: &mut PackageManifest,
    app: &mut AppLocals,
) -> Result<()> {
    let authentication = &options.authentication;
    if !authentication.enabled {
        return Ok(());
    }

    processor.render("routes/authentication.js", "routes/authentication.js", TemplateData::new())?;
    app.routers.push(RouterLocals {
        name: "authenticationRouter",
        location: "./routes/authentication",
        path: "/authentication",
    });

    if authentication.is_basic() {
        let deserializer = "middleware/basic-authentication-deserializer.js";
        processor.render(deserializer, deserializer, TemplateData::new())?;
        app.local_modules
            .insert("basicAuthenticationDeserializer", "./middleware/basic-authentication-deserializer.js");
        app.uses.push("basicAuthenticationDeserializer".into());
    }

    if authentication.is_passport() {
        app.modules.insert("passport", "passport");
        app.local_modules.insert("passportConfigure", "./passport-configuration.js");
        app.uses.push("passport.initialize()".into());
        app.uses.push("passport.session()".into());
        manifest.add_dependency("passport", "^0.4.0");
        for strategy in &authentication.strategies {
            let (package, version) = strategy.package();
            manifest.add_dependency(package, version);
        }
        processor.render("passport-configuration.js", "passport-configuration.js", TemplateData::new())?;
    }

    for middleware in ["middleware/bind-user-to-view-locals.js", "middleware/route-guard.js"] {
        processor.render(middleware, middleware, TemplateData::new())?;
    }
    app.local_modules.insert("bindUserToViewLocals", "./middleware/bind-user-to-view-locals.js");
    app.uses.push("bindUserToViewLocals".into());
    Ok(())
}
