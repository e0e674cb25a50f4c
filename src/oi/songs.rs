// Preprogrammed songs stored on the robot
//
// Define: [140, slot, note_count, note1, duration1, ...]
// Play:   [141, slot]

use super::protocol::Opcode;

/// A song: (MIDI note, duration in 1/64 s) pairs bound to a song slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Song {
    pub slot: u8,
    pub notes: &'static [(u8, u8)],
}

/// Rising jingle played on startup
pub const START_SONG: Song = Song {
    slot: 0,
    notes: &[(86, 32), (87, 32), (88, 32), (96, 64)],
};

/// Falling tones played when something needs attention
pub const WARNING_SONG: Song = Song {
    slot: 1,
    notes: &[(40, 32), (39, 32), (38, 32), (37, 64)],
};

impl Song {
    /// Arguments of the define command (without the opcode)
    pub fn define_args(&self) -> Vec<u8> {
        let mut args = Vec::with_capacity(2 + self.notes.len() * 2);
        args.push(self.slot);
        args.push(self.notes.len() as u8);
        for &(note, duration) in self.notes {
            args.push(note);
            args.push(duration);
        }
        args
    }

    pub fn define_frame(&self) -> Vec<u8> {
        let mut frame = vec![Opcode::DefineSong as u8];
        frame.extend(self.define_args());
        frame
    }

    pub fn play_frame(&self) -> [u8; 2] {
        [Opcode::PlaySong as u8, self.slot]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_song_bytes() {
        assert_eq!(
            START_SONG.define_frame(),
            vec![140, 0, 4, 86, 32, 87, 32, 88, 32, 96, 64]
        );
        assert_eq!(START_SONG.play_frame(), [141, 0]);
    }

    #[test]
    fn test_warning_song_bytes() {
        assert_eq!(
            WARNING_SONG.define_frame(),
            vec![140, 1, 4, 40, 32, 39, 32, 38, 32, 37, 64]
        );
        assert_eq!(WARNING_SONG.play_frame(), [141, 1]);
    }
}
