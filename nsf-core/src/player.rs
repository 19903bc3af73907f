use crate::bus::Bus;
use crate::constants::memory_range;
use crate::cpu_6502::{Cpu6502, Registers, StepError};
use crate::nsf::{NsfHeader, NsfLoadError, HEADER_SIZE};
use crate::opcodes::OpCode;

/// Which routine the player is currently running the CPU through. An NSF
/// file has no top-level program, only the init and play entry points, so
/// the driver supplies the control flow between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Nothing loaded yet.
    Idle,
    /// Inside the init routine; it has not returned yet.
    Init,
    /// Inside the play routine, re-entered once per frame.
    Play,
}

/// The NSF driver. It owns the interpreter, performs the pre-run sequence
/// when a file is loaded, and supplies the "call init once, then call play
/// forever" convention with synthetic jumps. Pacing is the host's business:
/// it calls `step` at whatever rate it likes and can read
/// `NsfHeader::play_speed_us` to match real hardware.
pub struct NsfPlayer {
    pub cpu: Cpu6502,
    pub header: Option<NsfHeader>,
    /// Completed play invocations since the file was loaded.
    pub frames: u64,
    phase: Phase,
    play_address: u16,
    /// The stack pointer at the synthetic entry into init or play. An RTS
    /// about to execute with the stack back at this depth is the routine
    /// returning to the driver, not to a JSR.
    entry_s: u8,
}

impl NsfPlayer {
    pub fn new() -> NsfPlayer {
        NsfPlayer {
            cpu: Cpu6502::new(Bus::new()),
            header: None,
            frames: 0,
            phase: Phase::Idle,
            play_address: 0,
            entry_s: 0,
        }
    }

    /// Load an NSF file and arm the interpreter on the header's starting
    /// song. The buffer is validated before any interpreter state changes.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), NsfLoadError> {
        self.load_song(bytes, None)
    }

    /// Load an NSF file, overriding the starting song (1-based) when one is
    /// given.
    pub fn load_song(&mut self, bytes: &[u8], song: Option<u8>) -> Result<(), NsfLoadError> {
        let header = NsfHeader::parse(bytes)?;

        let song = song.unwrap_or(header.starting_song);
        if song == 0 || song > header.total_songs {
            return Err(NsfLoadError::SongOutOfRange {
                song,
                total_songs: header.total_songs,
            });
        }

        let bus = &mut self.cpu.bus;

        // Clear the RAM an NSF program may rely on being zeroed: internal
        // RAM, cartridge work RAM, and the APU channel registers.
        bus.fill(memory_range::RAM.min, memory_range::RAM.max + 1, 0x00);
        bus.fill(
            memory_range::WORK_RAM.min,
            memory_range::WORK_RAM.max + 1,
            0x00,
        );
        bus.fill(
            memory_range::APU_CHANNELS.min,
            memory_range::APU_CHANNELS.max + 1,
            0x00,
        );

        // Enable the pulse, triangle and noise channels, and silence the
        // frame counter IRQ, the same priming a hardware player performs.
        bus.set_u8(memory_range::APU_STATUS, 0x0f);
        bus.set_u8(memory_range::APU_FRAME_COUNTER, 0x40);

        // The music program lands at the load address. Files longer than the
        // remaining address space wrap around to $0000.
        bus.load_at(&bytes[HEADER_SIZE..], header.load_address);

        // The init calling convention: A carries the zero-based song index,
        // X carries the region (0 NTSC, 1 PAL).
        self.cpu.a = song - 1;
        self.cpu.x = if header.pal { 1 } else { 0 };

        // Enter init with a synthetic jump rather than a JSR, so there is no
        // fabricated return address on the stack.
        self.cpu.jump(header.init_address);
        self.entry_s = self.cpu.s;
        self.phase = Phase::Init;
        self.frames = 0;
        self.play_address = header.play_address;
        self.header = Some(header);

        Ok(())
    }

    /// Execute one instruction. When the running routine is about to RTS
    /// with the stack balanced at its entry depth, it is returning to the
    /// driver; the RTS is replaced with a synthetic jump to play, so init
    /// runs once and play runs forever after. The instruction counter only
    /// ever counts instructions the 6502 really executed.
    pub fn step(&mut self) -> Result<(), StepError> {
        if self.phase != Phase::Idle
            && self.cpu.peek_u8() == OpCode::RTS as u8
            && self.cpu.s == self.entry_s
        {
            if self.phase == Phase::Play {
                self.frames += 1;
            }
            self.phase = Phase::Play;
            self.cpu.jump(self.play_address);
        }
        self.cpu.step()
    }

    pub fn registers(&self) -> Registers {
        self.cpu.registers()
    }

    pub fn instruction_count(&self) -> u64 {
        self.cpu.instruction_count()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::nsf::TvSystem;

    /// Assemble a minimal NSF image in memory:
    ///
    ///   init:  sta $f0    ; record the song index the driver handed over
    ///          rts
    ///   play:  inc $f1    ; count play calls
    ///          rts
    fn build_nsf(region: u8) -> Vec<u8> {
        let mut bytes = vec![0; HEADER_SIZE];
        bytes[0..5].copy_from_slice(b"NESM\x1a");
        bytes[0x05] = 0x01;
        bytes[0x06] = 5; // total songs
        bytes[0x07] = 1; // starting song
        bytes[0x08..0x0a].copy_from_slice(&0x8000u16.to_le_bytes());
        bytes[0x0a..0x0c].copy_from_slice(&0x8000u16.to_le_bytes());
        bytes[0x0c..0x0e].copy_from_slice(&0x8010u16.to_le_bytes());
        bytes[0x7a] = region;

        let mut body = vec![0; 0x13];
        body[0x00..0x03].copy_from_slice(&[
            OpCode::STA_zp as u8, 0xf0,
            OpCode::RTS as u8,
        ]);
        body[0x10..0x13].copy_from_slice(&[
            OpCode::INC_zp as u8, 0xf1,
            OpCode::RTS as u8,
        ]);
        bytes.extend(body);
        bytes
    }

    #[test]
    fn load_primes_memory_and_registers() {
        let mut player = NsfPlayer::new();
        // Dirty the regions the loader promises to clear.
        player.cpu.bus.set_u8(0x0005, 0xff);
        player.cpu.bus.set_u8(0x6100, 0xff);
        player.cpu.bus.set_u8(0x4002, 0xff);

        player.load(&build_nsf(0)).unwrap();

        assert_eq!(player.cpu.bus.read_u8(0x0005), 0x00);
        assert_eq!(player.cpu.bus.read_u8(0x6100), 0x00);
        assert_eq!(player.cpu.bus.read_u8(0x4002), 0x00);
        assert_eq!(player.cpu.bus.read_u8(0x4015), 0x0f);
        assert_eq!(player.cpu.bus.read_u8(0x4017), 0x40);

        // The body was copied to the load address.
        assert_eq!(player.cpu.bus.read_u8(0x8000), OpCode::STA_zp as u8);
        assert_eq!(player.cpu.bus.read_u8(0x8010), OpCode::INC_zp as u8);

        // Armed at init with A = song - 1 and X = NTSC.
        assert_eq!(player.cpu.pc, 0x8000);
        assert_eq!(player.cpu.a, 0);
        assert_eq!(player.cpu.x, 0);

        let header = player.header.as_ref().unwrap();
        assert_eq!(header.tv_system, TvSystem::NTSC);
    }

    #[test]
    fn pal_files_set_x() {
        let mut player = NsfPlayer::new();
        player.load(&build_nsf(0b0000_0001)).unwrap();
        assert_eq!(player.cpu.x, 1);
    }

    #[test]
    fn init_runs_once_then_play_repeats() {
        let mut player = NsfPlayer::new();
        player.load_song(&build_nsf(0), Some(3)).unwrap();
        assert_eq!(player.cpu.a, 2);

        // sta $f0 inside init.
        player.step().unwrap();
        assert_eq!(player.cpu.bus.read_u8(0x00f0), 2);
        assert_eq!(player.frames, 0);

        // Init's RTS becomes the synthetic jump to play, and the step runs
        // play's first instruction.
        player.step().unwrap();
        assert_eq!(player.cpu.bus.read_u8(0x00f1), 1);

        // Play returns and gets re-entered, once per completed frame.
        player.step().unwrap();
        assert_eq!(player.cpu.bus.read_u8(0x00f1), 2);
        assert_eq!(player.frames, 1);

        // Two more steps: another completed frame, another re-entry.
        player.step().unwrap();
        player.step().unwrap();
        assert_eq!(player.cpu.bus.read_u8(0x00f1), 4);
        assert_eq!(player.frames, 3);

        // Only real instructions made it into the counter.
        assert_eq!(player.instruction_count(), 5);
    }

    #[test]
    fn nested_subroutines_inside_init_still_return_to_the_driver() {
        // init JSRs to a helper before returning; the helper's RTS must not
        // be mistaken for init's own return.
        //
        //   init:    jsr helper
        //            rts
        //   helper:  lda #$42
        //            rts
        //   play:    inc $f1
        //            rts
        let mut bytes = build_nsf(0);
        let body = &mut bytes[HEADER_SIZE..];
        body[0x00..0x04].copy_from_slice(&[
            OpCode::JSR_abs as u8, 0x04, 0x80,
            OpCode::RTS as u8,
        ]);
        body[0x04..0x07].copy_from_slice(&[
            OpCode::LDA_imm as u8, 0x42,
            OpCode::RTS as u8,
        ]);

        let mut player = NsfPlayer::new();
        player.load(&bytes).unwrap();

        player.step().unwrap(); // jsr helper
        player.step().unwrap(); // lda #$42
        player.step().unwrap(); // helper's rts, executed for real
        assert_eq!(player.cpu.pc, 0x8003);
        assert_eq!(player.cpu.a, 0x42);
        assert_eq!(player.cpu.bus.read_u8(0x00f1), 0);

        // Now init's own RTS trampolines into play.
        player.step().unwrap();
        assert_eq!(player.cpu.bus.read_u8(0x00f1), 1);
    }

    #[test]
    fn rejects_songs_outside_the_file() {
        let mut player = NsfPlayer::new();
        let error = player.load_song(&build_nsf(0), Some(6)).unwrap_err();
        assert_eq!(
            error,
            NsfLoadError::SongOutOfRange {
                song: 6,
                total_songs: 5,
            }
        );

        let error = player.load_song(&build_nsf(0), Some(0)).unwrap_err();
        assert_eq!(
            error,
            NsfLoadError::SongOutOfRange {
                song: 0,
                total_songs: 5,
            }
        );
    }
}
