//! Debounced push-button gesture detector.
//!
//! ## Hardware
//!
//! Active-low momentary switch with internal pull-up.  The GPIO interrupt
//! fires on any edge and only records a timestamp; [`ButtonDriver::poll`]
//! (called from the input loop) samples the pin level and runs the gesture
//! state machine in [`ButtonDriver::tick`].
//!
//! ## Gestures
//!
//! | Gesture      | Condition                                       | Event         |
//! |--------------|-------------------------------------------------|---------------|
//! | Short press  | Released before 5 s, no second press in 300 ms  | `ShortPress`  |
//! | Double press | Second press starts within 300 ms of release    | `DoublePress` |
//! | Long press   | Held for 5 s (fires while still held)           | `LongPress`   |

use core::sync::atomic::{AtomicU32, Ordering};

pub const DEBOUNCE_MS: u32 = 50;
pub const LONG_PRESS_MS: u32 = 5000;
pub const DOUBLE_PRESS_WINDOW_MS: u32 = 300;

/// Last edge seen by the ISR (ms since boot, truncated to u32).
static BUTTON_ISR_TIMESTAMP: AtomicU32 = AtomicU32::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    ShortPress,
    LongPress,
    DoublePress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Idle,
    /// Level went low; waiting for it to stay low.  `first_release` is set
    /// when this is the second press of a possible double.
    Debounce {
        since_ms: u32,
        first_release: Option<u32>,
    },
    Pressed { since_ms: u32 },
    WaitSecondPress { released_ms: u32 },
    /// Gesture already emitted; ignore everything until release.
    WaitRelease,
}

pub struct ButtonDriver {
    gpio: i32,
    state: GestureState,
    last_edge_ms: u32,
}

impl ButtonDriver {
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            state: GestureState::Idle,
            last_edge_ms: 0,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == GestureState::Idle
    }

    /// Sample the pin and advance.  While idle the pin is only read after
    /// the ISR has recorded a new edge.
    pub fn poll(&mut self, now_ms: u32) -> Option<ButtonEvent> {
        let edge = BUTTON_ISR_TIMESTAMP.load(Ordering::Acquire);
        let new_edge = edge != self.last_edge_ms;
        self.last_edge_ms = edge;

        if self.is_idle() && !new_edge {
            return None;
        }
        self.tick(now_ms, self.is_pressed_hw())
    }

    /// Gesture state machine.  `pressed` is the debounced-input level at
    /// `now_ms`.
    pub fn tick(&mut self, now_ms: u32, pressed: bool) -> Option<ButtonEvent> {
        match self.state {
            GestureState::Idle => {
                if pressed {
                    self.state = GestureState::Debounce {
                        since_ms: now_ms,
                        first_release: None,
                    };
                }
                None
            }

            GestureState::Debounce {
                since_ms,
                first_release,
            } => {
                if !pressed {
                    // Bounce: fall back to wherever we came from.
                    self.state = match first_release {
                        Some(released_ms) => GestureState::WaitSecondPress { released_ms },
                        None => GestureState::Idle,
                    };
                    return None;
                }
                if now_ms.wrapping_sub(since_ms) < DEBOUNCE_MS {
                    return None;
                }
                if first_release.is_some() {
                    self.state = GestureState::WaitRelease;
                    return Some(ButtonEvent::DoublePress);
                }
                self.state = GestureState::Pressed { since_ms };
                None
            }

            GestureState::Pressed { since_ms } => {
                if !pressed {
                    self.state = GestureState::WaitSecondPress {
                        released_ms: now_ms,
                    };
                    return None;
                }
                if now_ms.wrapping_sub(since_ms) >= LONG_PRESS_MS {
                    self.state = GestureState::WaitRelease;
                    return Some(ButtonEvent::LongPress);
                }
                None
            }

            GestureState::WaitSecondPress { released_ms } => {
                let gap = now_ms.wrapping_sub(released_ms);
                if pressed && gap <= DOUBLE_PRESS_WINDOW_MS {
                    self.state = GestureState::Debounce {
                        since_ms: now_ms,
                        first_release: Some(released_ms),
                    };
                    return None;
                }
                if gap > DOUBLE_PRESS_WINDOW_MS {
                    self.state = if pressed {
                        GestureState::Debounce {
                            since_ms: now_ms,
                            first_release: None,
                        }
                    } else {
                        GestureState::Idle
                    };
                    return Some(ButtonEvent::ShortPress);
                }
                None
            }

            GestureState::WaitRelease => {
                if !pressed {
                    self.state = GestureState::Idle;
                }
                None
            }
        }
    }

    /// Active low.
    fn is_pressed_hw(&self) -> bool {
        !crate::drivers::hw_init::gpio_read(self.gpio)
    }
}

/// ISR body for the button GPIO (any edge).  Lock-free.
pub fn button_isr_handler(now_ms: u32) {
    // 0 means "no edge yet"; nudge a genuine edge at t=0.
    BUTTON_ISR_TIMESTAMP.store(now_ms.max(1), Ordering::Release);
}
