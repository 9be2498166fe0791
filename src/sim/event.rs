/// Events emitted by the session (tick or command submission).
/// The presentation layer consumes these for sound and messages.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    LevelCompleted { id: u32 },
    AllLevelsCompleted,
    CommandFailed,
    KonamiUnlocked,
}
