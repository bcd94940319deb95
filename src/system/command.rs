//! Serial command line assembly and parsing
//!
//! Best-effort, line-oriented parser for the operator protocol. Commands are
//! ASCII, terminated by a carriage return, classified by their first byte:
//!
//! - `K<hex>` mining key
//! - `T<int>` torque override
//! - `V<float>` target velocity (rev/s)
//! - `P<float>` / `R<float>` target position / rotation (revolutions)
//!
//! Unknown prefixes and malformed payloads are dropped without an error;
//! the buffer resets after every terminator regardless.

/// Fixed command line capacity; longer lines overwrite the last slot
const LINE_CAPACITY: usize = 32;

/// A parsed operator command
#[derive(Debug, Clone, Copy, PartialEq, defmt::Format)]
pub enum Command {
    Key(u64),
    Torque(i32),
    Velocity(f32),
    Position(f32),
}

/// Accumulates serial bytes into commands
pub struct CommandLine {
    buf: [u8; LINE_CAPACITY],
    len: usize,
}

impl CommandLine {
    pub const fn new() -> Self {
        Self {
            buf: [0; LINE_CAPACITY],
            len: 0,
        }
    }

    /// Feeds one byte; returns a command when a terminator completes a
    /// recognizable line.
    pub fn push(&mut self, byte: u8) -> Option<Command> {
        if byte == b'\r' {
            let command = parse(&self.buf[..self.len]);
            self.len = 0;
            return command;
        }
        if self.len < LINE_CAPACITY {
            self.buf[self.len] = byte;
            self.len += 1;
        } else {
            // Full: keep overwriting the final slot until a terminator
            self.buf[LINE_CAPACITY - 1] = byte;
        }
        None
    }
}

fn parse(line: &[u8]) -> Option<Command> {
    let (&prefix, payload) = line.split_first()?;
    let payload = core::str::from_utf8(payload).ok()?;
    match prefix {
        b'K' => u64::from_str_radix(payload, 16).ok().map(Command::Key),
        b'T' => payload.parse().ok().map(Command::Torque),
        b'V' => payload.parse().ok().map(Command::Velocity),
        b'P' | b'R' => payload.parse().ok().map(Command::Position),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(bytes: &[u8]) -> heapless::Vec<Command, 4> {
        let mut parser = CommandLine::new();
        let mut out = heapless::Vec::new();
        for &b in bytes {
            if let Some(cmd) = parser.push(b) {
                out.push(cmd).unwrap();
            }
        }
        out
    }

    #[test]
    fn key_command_round_trips_hex() {
        let cmds = run(b"K1A2B3C4D\r");
        assert_eq!(cmds.as_slice(), &[Command::Key(0x1A2B3C4D)]);
    }

    #[test]
    fn velocity_command_round_trips_float() {
        let cmds = run(b"V75.5\r");
        assert_eq!(cmds.as_slice(), &[Command::Velocity(75.5)]);
    }

    #[test]
    fn rotation_prefix_also_sets_the_position_target() {
        assert_eq!(run(b"P-2.5\r").as_slice(), &[Command::Position(-2.5)]);
        assert_eq!(run(b"R12\r").as_slice(), &[Command::Position(12.0)]);
    }

    #[test]
    fn torque_command_parses_signed_int() {
        assert_eq!(run(b"T-300\r").as_slice(), &[Command::Torque(-300)]);
    }

    #[test]
    fn unknown_prefix_and_garbage_are_silently_dropped() {
        assert!(run(b"X123\r").is_empty());
        assert!(run(b"Vnot-a-number\r").is_empty());
        assert!(run(b"\r").is_empty());
    }

    #[test]
    fn overlong_line_never_grows_and_recovers_on_terminator() {
        let mut parser = CommandLine::new();
        for _ in 0..500 {
            assert_eq!(parser.push(b'9'), None);
        }
        // Overflowed garbage line parses to nothing but resets the buffer
        assert_eq!(parser.push(b'\r'), None);
        for (i, cmd) in b"V5\r".iter().map(|&b| parser.push(b)).enumerate() {
            if i == 2 {
                assert_eq!(cmd, Some(Command::Velocity(5.0)));
            } else {
                assert_eq!(cmd, None);
            }
        }
    }

    #[test]
    fn back_to_back_commands_each_produce_one_event() {
        let cmds = run(b"V10\rR3.5\r");
        assert_eq!(
            cmds.as_slice(),
            &[Command::Velocity(10.0), Command::Position(3.5)]
        );
    }
}
