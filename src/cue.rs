/// Feedback signals fired by the game. Playing one never fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Move,
    Victory,
}

pub trait CuePlayer {
    fn play(&mut self, cue: Cue);
}

/// Writes each cue to the log; used where no audio device is wired up.
#[derive(Debug, Default)]
pub struct LogCuePlayer {
    played: usize,
}

impl LogCuePlayer {
    pub fn played(&self) -> usize {
        self.played
    }
}

impl CuePlayer for LogCuePlayer {
    fn play(&mut self, cue: Cue) {
        self.played += 1;
        log::debug!("cue: {:?}", cue);
    }
}
