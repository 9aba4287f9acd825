use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use rompatch_lib::badges::{generate_badge_css, write_css_file};

use crate::commands::open_archive;
use crate::error::CliError;

pub(crate) fn run_badges(root: Option<&Path>, output: Option<&Path>) -> Result<(), CliError> {
    let (layout, tables) = open_archive(root)?;
    let output_path = output.map_or_else(|| layout.badges_path.clone(), Path::to_path_buf);

    write_css_file(&output_path, &generate_badge_css(&tables))?;

    log::info!(
        "{} Generated {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        layout
            .display_path(&output_path)
            .display()
            .if_supports_color(Stdout, |t| t.cyan()),
    );
    log::info!("  - {} system badges", tables.systems.len());
    log::info!("  - {} ROM badges", tables.base_roms.len());
    Ok(())
}
