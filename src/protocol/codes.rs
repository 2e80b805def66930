//! Raw byte sequences of the Minitel screen protocol.
//!
//! References point to the STUM1B manual
//! (<https://jbellue.github.io/stum1b/>).

/// Escape introducer for screen-side commands
pub const ESC: u8 = 0x1B;

/// Keyboard-side prefix of every function key code (§2.3.6)
pub const SEP: u8 = 0x13;

/// Single-shift 2: introduces accents and special characters (§2.3.5.1.2)
pub const SS2: u8 = 0x19;

/// Repeat the last printed character (§2.2.1.2.6.1)
pub const REP: u8 = 0x12;

/// Unit separator: absolute cursor positioning and cursor position reply
pub const US: u8 = 0x1F;

/// Offset added to rows, columns and repeat counts on the wire
pub const POSITION_OFFSET: u8 = 0x41;

// Cursor (§2.2.1.2.5.2)
pub const MOVE_CURSOR_LEFT: u8 = 0x08;
pub const MOVE_CURSOR_RIGHT: u8 = 0x09;
pub const MOVE_CURSOR_DOWN: u8 = 0x0A;
pub const MOVE_CURSOR_UP: u8 = 0x0B;
pub const SHOW_CURSOR: u8 = 0x11;
pub const HIDE_CURSOR: u8 = 0x14;

/// §2.6.6.2
pub const GET_CURSOR_POSITION: [u8; 2] = [ESC, 0x61];

// Screen
pub const CLEAR_SCREEN_AND_HOME: u8 = 0x0C;
pub const CLEAR_END_OF_LINE: u8 = 0x18;
pub const CLEAR_BOTTOM_OF_SCREEN: [u8; 3] = [ESC, 0x5B, 0x4A];

// Formatting (§2.2.1.2.4.2)
pub const INVERSE_ON: [u8; 2] = [ESC, 0x5D];
pub const INVERSE_OFF: [u8; 2] = [ESC, 0x5C];
pub const UNDERLINE_ON: [u8; 2] = [ESC, 0x5A];
pub const UNDERLINE_OFF: [u8; 2] = [ESC, 0x59];
pub const BLINK_ON: [u8; 2] = [ESC, 0x48];
pub const BLINK_OFF: [u8; 2] = [ESC, 0x49];

// Semigraphic set (§2.2.1.2.3.3)
pub const GRAPHICS_MODE_ON: u8 = 0x0E;
pub const GRAPHICS_MODE_OFF: u8 = 0x0F;

// Protocol commands (§2.6.2)
const PRO2: u8 = 0x3A;
const PRO3: u8 = 0x3B;

// Routing (§2.6.3.2)
const ROUTING_OFF: u8 = 0x60;
const ROUTING_ON: u8 = 0x61;

// Modules (§2.6.1)
const SCREEN_SEND: u8 = 0x50;
const SCREEN_RECEIVE: u8 = 0x58;
const MODEM_SEND: u8 = 0x52;
const SOCKET_SEND: u8 = 0x53;

// The keyboard reaches the screen through the modem in local mode, so echo
// is a routing between the modem emitter and the screen receiver.
pub const LOCAL_ECHO_OFF: [u8; 5] = [ESC, PRO3, ROUTING_OFF, SCREEN_RECEIVE, MODEM_SEND];
pub const LOCAL_ECHO_ON: [u8; 5] = [ESC, PRO3, ROUTING_ON, SCREEN_RECEIVE, MODEM_SEND];

/// Bytes the terminal sends back after a local echo routing change
pub const LOCAL_ECHO_ACK_LEN: usize = 5;

// Rolling mode (§2.6.11.1)
const START: u8 = 0x69;
const STOP: u8 = 0x6A;
const SCROLL: u8 = 0x43;
pub const SCROLL_ON: [u8; 4] = [ESC, PRO2, START, SCROLL];
pub const SCROLL_OFF: [u8; 4] = [ESC, PRO2, STOP, SCROLL];

/// Bytes the terminal sends back after a rolling mode change
pub const SCROLL_ACK_LEN: usize = 4;

// Acknowledgements (§2.6.4.2), for both the screen and the socket
const ACK_OFF: u8 = 0x64;
pub const ACKNOWLEDGE_OFF: [u8; 8] = [
    ESC, PRO2, ACK_OFF, SCREEN_SEND, //
    ESC, PRO2, ACK_OFF, SOCKET_SEND,
];

pub const BEEP: [u8; 2] = [ESC, 0x07];

/// Absolute cursor move. `x` is the column, `y` the row.
pub fn move_cursor(x: u8, y: u8) -> [u8; 3] {
    [
        US,
        POSITION_OFFSET.wrapping_add(y),
        POSITION_OFFSET.wrapping_add(x),
    ]
}

/// Largest count a single REP command carries
pub const MAX_REPEAT: usize = 0x7F - 0x40;

/// `REP` commands repeating the last character `times` times.
pub fn repeat_last_character(times: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 * (times / MAX_REPEAT + 1));
    let mut remaining = times;
    while remaining > 0 {
        let n = remaining.min(MAX_REPEAT);
        out.push(REP);
        out.push(0x40 + n as u8);
        remaining -= n;
    }
    out
}

/// `c` printed `times` times, using REP once it is shorter than spelling it out.
pub fn repeat_character(c: u8, times: usize) -> Vec<u8> {
    match times {
        0..=3 => vec![c; times],
        _ => {
            let mut out = vec![c];
            out.extend(repeat_last_character(times - 1));
            out
        }
    }
}
