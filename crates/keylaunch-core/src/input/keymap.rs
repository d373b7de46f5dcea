// Keylaunch Key Code Mapping
// Linux input-event-codes to characters and tracked modifiers

use crate::modifier::ModifierKey;

/// Key code for BACKSPACE, used by the synthetic-erase injector.
pub const KEY_BACKSPACE: u16 = 14;

pub const KEY_LEFT_SHIFT: u16 = 42;
pub const KEY_RIGHT_SHIFT: u16 = 54;

/// Map a key code to a tracked modifier, if it is one.
///
/// META is the command key, ALT is option, matching the grammar codes
/// ("cmd+1") the configuration uses.
pub fn modifier_for_code(code: u16) -> Option<ModifierKey> {
    match code {
        125 | 126 => Some(ModifierKey::Command), // LEFT_META / RIGHT_META
        42 | 54 => Some(ModifierKey::Shift),     // LEFT_SHIFT / RIGHT_SHIFT
        56 | 100 => Some(ModifierKey::Option),   // LEFT_ALT / RIGHT_ALT
        _ => None,
    }
}

/// Map a key code to the character it produces on a US layout.
///
/// Returns None for anything non-printable; those keys never reach the
/// listener loop.
pub fn char_for_code(code: u16, shifted: bool) -> Option<char> {
    let (base, shift) = match code {
        2 => ('1', '!'),
        3 => ('2', '@'),
        4 => ('3', '#'),
        5 => ('4', '$'),
        6 => ('5', '%'),
        7 => ('6', '^'),
        8 => ('7', '&'),
        9 => ('8', '*'),
        10 => ('9', '('),
        11 => ('0', ')'),
        12 => ('-', '_'),
        13 => ('=', '+'),
        16 => ('q', 'Q'),
        17 => ('w', 'W'),
        18 => ('e', 'E'),
        19 => ('r', 'R'),
        20 => ('t', 'T'),
        21 => ('y', 'Y'),
        22 => ('u', 'U'),
        23 => ('i', 'I'),
        24 => ('o', 'O'),
        25 => ('p', 'P'),
        26 => ('[', '{'),
        27 => (']', '}'),
        30 => ('a', 'A'),
        31 => ('s', 'S'),
        32 => ('d', 'D'),
        33 => ('f', 'F'),
        34 => ('g', 'G'),
        35 => ('h', 'H'),
        36 => ('j', 'J'),
        37 => ('k', 'K'),
        38 => ('l', 'L'),
        39 => (';', ':'),
        40 => ('\'', '"'),
        41 => ('`', '~'),
        43 => ('\\', '|'),
        44 => ('z', 'Z'),
        45 => ('x', 'X'),
        46 => ('c', 'C'),
        47 => ('v', 'V'),
        48 => ('b', 'B'),
        49 => ('n', 'N'),
        50 => ('m', 'M'),
        51 => (',', '<'),
        52 => ('.', '>'),
        53 => ('/', '?'),
        57 => (' ', ' '),
        _ => return None,
    };
    Some(if shifted { shift } else { base })
}
