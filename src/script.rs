//! PyMOL scripts that color residues of a structure.
//!
//! Every script starts with the `cmd` import, lists one command per position or
//! range and always ends with the same trailer (cartoon view, white background,
//! zoom to fit). Consumers depend on that layout.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::error::FileError;
use crate::site_annotation::{SiteAnnotation, SiteKind};
use crate::variant::AnnotatedPosition;

pub const SCRIPT_HEADER: &str = "from pymol import cmd\n\n";
pub const SCRIPT_TRAILER: &str = "\ncmd.show('cartoon')\ncmd.bg_color('white')\ncmd.zoom()\n";

pub const DEFAULT_VARIANT_SCRIPT: &str = "color_code_script.pml";
pub const DEFAULT_SITE_SCRIPT: &str = "site_script.pml";

/// Color used for a functional site, if it gets one at all
pub fn site_color(kind: &SiteKind) -> Option<&'static str> {
    match kind {
        SiteKind::ActiveSite => Some("yellow"),
        SiteKind::BindingSite => Some("blue"),
        SiteKind::Other(_) => None,
    }
}

/// Collapse whitespace and control characters so text stays on one comment line
fn single_line(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct ScriptEmitter<W: Write> {
    out: W,
}

impl<W: Write> ScriptEmitter<W> {
    /// Start a script by writing its header
    pub fn new(mut out: W) -> io::Result<Self> {
        out.write_all(SCRIPT_HEADER.as_bytes())?;
        Ok(Self { out })
    }

    /// Color a single residue. Unclassified positions are listed as a comment.
    pub fn position(&mut self, annotated: &AnnotatedPosition) -> io::Result<()> {
        match annotated.color {
            Some(color) => writeln!(
                self.out,
                "cmd.color('{}', 'resi {}')",
                color, annotated.position
            ),
            None => writeln!(
                self.out,
                "# resi {}: {}",
                annotated.position,
                single_line(&annotated.classification_label)
            ),
        }
    }

    /// Color a site range. Returns `false` if the site kind has no color.
    pub fn site(&mut self, site: &SiteAnnotation) -> io::Result<bool> {
        match site_color(&site.kind) {
            Some(color) => {
                writeln!(
                    self.out,
                    "cmd.color('{}', 'resi {}-{}')",
                    color, site.range.start, site.range.end
                )?;
                Ok(true)
            }
            None => {
                debug!(kind = %site.kind, range = %site.range, "no color for site kind, skipping");
                Ok(false)
            }
        }
    }

    /// Write the trailer and hand back the destination
    pub fn finish(mut self) -> io::Result<W> {
        self.out.write_all(SCRIPT_TRAILER.as_bytes())?;
        self.out.flush()?;
        Ok(self.out)
    }
}

pub fn write_position_script<W: Write>(out: W, positions: &[AnnotatedPosition]) -> io::Result<W> {
    let mut emitter = ScriptEmitter::new(out)?;
    for annotated in positions {
        emitter.position(annotated)?;
    }
    emitter.finish()
}

pub fn write_site_script<W: Write>(out: W, sites: &[SiteAnnotation]) -> io::Result<W> {
    let mut emitter = ScriptEmitter::new(out)?;
    for site in sites {
        emitter.site(site)?;
    }
    emitter.finish()
}

pub fn write_position_script_file<P: AsRef<Path>>(
    path: P,
    positions: &[AnnotatedPosition],
) -> Result<(), FileError> {
    let file = File::create(&path).map_err(|e| FileError::io(Some(&path), e))?;
    write_position_script(BufWriter::new(file), positions)
        .map_err(|e| FileError::io(Some(&path), e))?;
    info!(path = %path.as_ref().display(), positions = positions.len(), "wrote coloring script");
    Ok(())
}

pub fn write_site_script_file<P: AsRef<Path>>(
    path: P,
    sites: &[SiteAnnotation],
) -> Result<(), FileError> {
    let file = File::create(&path).map_err(|e| FileError::io(Some(&path), e))?;
    write_site_script(BufWriter::new(file), sites).map_err(|e| FileError::io(Some(&path), e))?;
    info!(path = %path.as_ref().display(), sites = sites.len(), "wrote site script");
    Ok(())
}
