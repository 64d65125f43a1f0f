use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;

mod com;
mod config;
mod digest;
mod protocol;
mod rom;

use com::SerialCom;
use config::{Args, Config};
use protocol::EverdriveX7;
use rom::RomImage;

fn main() -> Result<()> {
    env_logger::init();
    let config = Config::resolve(Args::parse())?;

    let image = RomImage::load(&config.rom)?;
    println!(
        "Loaded {} bytes ({} blocks)",
        image.data().len(),
        image.block_count()
    );

    print!("Connecting to {}...", config.device);
    flush_stdout();
    let com = SerialCom::open(&config)
        .map_err(fail_step)
        .with_context(|| format!("opening serial port {}", config.device))?;
    println!("OK");

    let mut cart = EverdriveX7::new(Box::new(com));

    print!("Connection test...");
    flush_stdout();
    cart.verify_link()
        .map_err(fail_step)
        .context("cartridge link test failed")?;
    println!("OK");

    print!("Sending game data");
    flush_stdout();
    let summary = cart
        .upload(&image, |_, _| {
            print!(".");
            flush_stdout();
        })
        .map_err(fail_step)
        .context("game upload failed")?;
    println!("OK ({} bytes in {} blocks)", summary.bytes_sent, summary.blocks_sent);
    if !summary.integrity_ok() {
        eprintln!(
            "WARNING: sent data digests to {:032x} but the image digests to {:032x}; the cart may hold a corrupt copy",
            summary.sent_digest, summary.source_digest
        );
    }

    print!("Starting game ({})...", config.run_mode);
    flush_stdout();
    cart.start_game(config.run_mode)
        .map_err(fail_step)
        .context("starting the game failed")?;
    println!("OK");

    Ok(())
}

fn flush_stdout() {
    let _ = io::stdout().flush();
}

/// Terminates the pending status line before the error unwinds to the top.
fn fail_step<E>(err: E) -> E {
    println!("ERROR");
    err
}
