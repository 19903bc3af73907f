use colored::*;
use nsf_core::cpu_6502::StepError;
use nsf_core::nsf::NsfLoadError;
use nsf_core::opcodes;
use nsf_core::player::NsfPlayer;
use std::path::PathBuf;
use std::process::exit;
use std::thread;
use std::time::Duration;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "nsf-player",
    about = "Run an NSF music program through the 6502 interpreter."
)]
struct CliOptions {
    /// The path to an NSF file (.nsf)
    file: PathBuf,
    /// The 1-based song to play, defaulting to the header's starting song
    #[structopt(short, long)]
    song: Option<u8>,
    /// Instructions to execute per second, 0 runs unthrottled
    #[structopt(long, default_value = "0")]
    hz: u64,
    /// Stop once this many instructions have executed
    #[structopt(short, long, default_value = "1000000")]
    max_instructions: u64,
    /// Disassemble every Nth executed instruction while running
    #[structopt(short, long)]
    trace: Option<u64>,
    /// A hex start:end range of memory to dump after the run, e.g. 0000:0100
    #[structopt(short, long)]
    inspect: Option<String>,
}

fn main() {
    let options = CliOptions::from_args();

    let bytes = match std::fs::read(&options.file) {
        Ok(bytes) => bytes,
        Err(error) => {
            eprintln!("Unable to read {:?}: {}", options.file, error);
            exit(1);
        }
    };

    let mut player = NsfPlayer::new();
    if let Err(error) = player.load_song(&bytes, options.song) {
        match error {
            NsfLoadError::NotNsf => {
                eprintln!("The file does not start with \"NESM\", so it is not an NSF file.");
            }
            NsfLoadError::Truncated => {
                eprintln!("The file ends before the 128 byte NSF header does.");
            }
            NsfLoadError::SongOutOfRange { song, total_songs } => {
                eprintln!(
                    "Song {} was requested but the file holds songs 1 to {}.",
                    song, total_songs
                );
            }
        }
        exit(1);
    }

    print_file_card(&player);
    run(&mut player, &options);
    print_registers(&player);

    if let Some(inspect) = &options.inspect {
        match parse_hex_range(inspect) {
            Some((start, end)) => print_memory_window(&player, start, end),
            None => {
                eprintln!("Expected --inspect to look like 0000:0100, got {:?}", inspect);
                exit(1);
            }
        }
    }
}

fn run(player: &mut NsfPlayer, options: &CliOptions) {
    // Sleep in ~10ms slices to approximate the requested rate.
    let batch = if options.hz == 0 {
        u64::MAX
    } else {
        (options.hz / 100).max(1)
    };

    while player.instruction_count() < options.max_instructions {
        if let Some(every) = options.trace {
            if every != 0 && player.instruction_count() % every == 0 {
                let pc = player.cpu.pc;
                let (text, _) = opcodes::disassemble(&player.cpu.bus, pc);
                println!("{}", format!("{:10}  {:04x}  {}", player.instruction_count(), pc, text).dimmed());
            }
        }

        match player.step() {
            Ok(()) => {}
            Err(StepError::UnknownOpcode { opcode, pc }) => {
                eprintln!(
                    "{}",
                    format!(
                        "The interpreter hit the unknown opcode {:#04x} at {:#06x} after {} instructions.",
                        opcode,
                        pc,
                        player.instruction_count()
                    )
                    .red()
                );
                exit(1);
            }
        }

        if player.instruction_count() % batch == 0 {
            thread::sleep(Duration::from_millis(10));
        }
    }
}

fn print_file_card(player: &NsfPlayer) {
    let header = player.header.as_ref().expect("A file is loaded.");
    println!("{}", "┣━━━━┫ NSF ┣━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┫".cyan());
    println!("  {} {}", "Song:".dimmed(), header.song_name.bold());
    println!("  {} {}", "Artist:".dimmed(), header.artist);
    println!("  {} {}", "Copyright:".dimmed(), header.copyright);
    println!(
        "  {} {} (starting at {})",
        "Songs:".dimmed(),
        header.total_songs,
        header.starting_song
    );
    println!(
        "  {} {:?}, one play call per {}µs",
        "Region:".dimmed(),
        header.tv_system,
        header.play_speed_us()
    );
    println!(
        "  {} load ${:04x}, init ${:04x}, play ${:04x}",
        "Entry:".dimmed(),
        header.load_address,
        header.init_address,
        header.play_address
    );
}

fn print_registers(player: &NsfPlayer) {
    let registers = player.registers();
    println!("{}", "┣━━━━┫ Registers ┣━━━━━━━━━━━━━━━━━━━━━━━━━━┫".cyan());
    println!("{}", "  PC    A  X  Y  SP  NV-BDIZC".dimmed());
    println!(
        "  {:04x}  {:02x} {:02x} {:02x} {:02x}  {:08b}",
        registers.pc, registers.a, registers.x, registers.y, registers.s, registers.p
    );
    println!(
        "  {} {} instructions, {} play frames",
        "Ran:".dimmed(),
        player.instruction_count(),
        player.frames
    );
}

fn print_memory_window(player: &NsfPlayer, start: u32, end: u32) {
    println!("{}", "┣━━━━┫ Memory ┣━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┫".cyan());
    for row in (start..end).step_by(16) {
        print!("{}", format!("  {:04x} │ ", row).dimmed());
        for address in row..(row + 16).min(end) {
            print_byte(player.cpu.bus.read_u8(address as u16));
            print!(" ");
        }
        println!();
    }
}

fn print_byte(byte: u8) {
    print!("{}", {
        match byte {
            0..=31 => format!("{:02x}", byte).magenta().dimmed(),
            32..=63 => format!("{:02x}", byte).magenta(),
            64..=95 => format!("{:02x}", byte).blue().dimmed(),
            96..=127 => format!("{:02x}", byte).blue(),
            128..=159 => format!("{:02x}", byte).cyan().dimmed(),
            160..=191 => format!("{:02x}", byte).cyan(),
            192..=223 => format!("{:02x}", byte).green().dimmed(),
            224..=255 => format!("{:02x}", byte).green(),
        }
    })
}

/// Parse a window like "6000:6100" into its bounds. The end is exclusive and
/// may be up to 0x10000.
fn parse_hex_range(text: &str) -> Option<(u32, u32)> {
    let mut parts = text.split(':');
    let start = u32::from_str_radix(parts.next()?, 16).ok()?;
    let end = u32::from_str_radix(parts.next()?, 16).ok()?;
    if parts.next().is_some() || start > end || end > 0x10000 {
        return None;
    }
    Some((start, end))
}
