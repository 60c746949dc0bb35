//! Template rendering for the HTML pages.
//!
//! Templates are embedded at compile time from `templates/` so the binary is
//! self-contained. `.html` templates are HTML auto-escaped.

use include_dir::{include_dir, Dir, DirEntry};
use minijinja::{AutoEscape, Environment};
use once_cell::sync::Lazy;

static TEMPLATE_DIR: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/templates");

static ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();

    env.set_auto_escape_callback(|name| {
        if name.ends_with(".html") {
            AutoEscape::Html
        } else {
            AutoEscape::None
        }
    });

    load_dir(&mut env, &TEMPLATE_DIR);

    env
});

/// Register every template under `dir`, named by its path relative to `templates/`.
fn load_dir(env: &mut Environment<'static>, dir: &'static Dir<'static>) {
    for entry in dir.entries() {
        match entry {
            DirEntry::Dir(sub) => load_dir(env, sub),
            DirEntry::File(file) => {
                let (Some(name), Some(contents)) = (file.path().to_str(), file.contents_utf8())
                else {
                    tracing::warn!(path = ?file.path(), "Skipping unreadable template");
                    continue;
                };
                if let Err(e) = env.add_template(name, contents) {
                    tracing::error!(template = name, error = %e, "Failed to load template");
                }
            }
        }
    }
}

pub fn render_template<T: serde::Serialize>(name: &str, ctx: T) -> Result<String, minijinja::Error> {
    let tpl = ENV.get_template(name)?;
    tpl.render(ctx)
}
