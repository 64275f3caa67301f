//! Convert CCM glyph atlases to and from text descriptors.

use std::path::Path;

use ccm_font::{Ccm, CcmError, DescriptorOptions};

fn main() -> Result<(), Error> {
    env_logger::init();
    let args = flags::Ccmtool::from_env().map_err(Error::new)?;
    match args.subcommand {
        flags::CcmtoolCmd::Export(cmd) => export(&cmd),
        flags::CcmtoolCmd::Import(cmd) => import(&cmd),
        flags::CcmtoolCmd::Info(cmd) => info(&cmd.input),
    }
}

fn export(cmd: &flags::Export) -> Result<(), Error> {
    let defaults = DescriptorOptions::default();
    let options = DescriptorOptions {
        face: cmd.face.clone().unwrap_or(defaults.face),
        size: cmd.size.unwrap_or(defaults.size),
        page_prefix: cmd.page_prefix.clone().unwrap_or(defaults.page_prefix),
        y_offset: cmd.y_offset.unwrap_or(defaults.y_offset),
    };

    println!("Reading from {}", cmd.input.display());
    let ccm = ccm_font::read_ccm_file(&cmd.input)?;
    let text = ccm_font::ccm_to_descriptor_text(&ccm, &options);

    println!("Writing to {}", cmd.output.display());
    std::fs::write(&cmd.output, text).map_err(CcmError::from)?;
    Ok(())
}

fn import(cmd: &flags::Import) -> Result<(), Error> {
    println!("Reading reference from {}", cmd.reference.display());
    let reference = ccm_font::read_ccm_file(&cmd.reference)?;
    let text = std::fs::read_to_string(&cmd.input).map_err(CcmError::from)?;
    let ccm = ccm_font::descriptor_text_to_ccm(&text, &reference)?;

    println!(
        "Writing {} glyphs to {}",
        ccm.glyphs.len(),
        cmd.output.display()
    );
    ccm_font::write_ccm_file(&cmd.output, &ccm)?;
    Ok(())
}

fn info(input: &Path) -> Result<(), Error> {
    let ccm = ccm_font::read_ccm_file(input)?;
    print_summary(&ccm);
    Ok(())
}

fn print_summary(ccm: &Ccm) {
    println!(
        "version     {:?} (0x{:X}, {:?})",
        ccm.version,
        ccm.version.tag(),
        ccm.version.layout()
    );
    println!("full width  {}", ccm.full_width);
    println!("atlas       {}x{}", ccm.tex_width, ccm.tex_height);
    println!("pages       {}", ccm.tex_count);
    println!("unk0e       0x{:04X}", ccm.unk0e);
    println!("unk1c/1d    0x{:02X} 0x{:02X}", ccm.unk1c, ccm.unk1d);
    match (ccm.glyphs.keys().next(), ccm.glyphs.keys().next_back()) {
        (Some(first), Some(last)) => println!(
            "glyphs      {} (0x{first:X}..=0x{last:X})",
            ccm.glyphs.len()
        ),
        _ => println!("glyphs      0"),
    }
}

#[derive(Debug, Clone)]
struct Error(String);

impl Error {
    fn new(t: impl std::fmt::Display) -> Self {
        Self(t.to_string())
    }
}

impl From<CcmError> for Error {
    fn from(err: CcmError) -> Self {
        Self::new(err)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for Error {}

mod flags {
    use std::path::PathBuf;

    xflags::xflags! {
        /// Convert CCM glyph atlases to and from BMFont text descriptors
        cmd ccmtool {
            /// Write a text descriptor describing every glyph of a CCM file
            cmd export {
                required input: PathBuf
                required output: PathBuf
                /// Face name written to the info line
                optional --face face: String
                /// Point size written to the info line
                optional --size size: i32
                /// Page files are named PREFIX_N.dds
                optional --page-prefix page_prefix: String
                /// yoffset written for every glyph
                optional --y-offset y_offset: i32
            }
            /// Rebuild a CCM file from a text descriptor and a reference CCM
            cmd import {
                required reference: PathBuf
                required input: PathBuf
                required output: PathBuf
            }
            /// Print the header of a CCM file
            cmd info {
                required input: PathBuf
            }
        }
    }
}
