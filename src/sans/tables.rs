//! Static tables shared by every decoder.

/// Physical module number of a detector module.
pub type ModuleId = u16;

/// Number of readout links.
pub const LINKS: usize = 24;

/// Number of channel groups multiplexed onto one link.
pub const GROUPS: usize = 12;

/// Number of payload lanes within a channel group.
pub const LANES: usize = 2;

/// Payload bit-length selected by each 3-bit code.
pub const CODE_LENGTH: [u8; 8] = [8, 18, 2, 3, 4, 5, 6, 7];

/// Module number for each (link, channel group) pair; `-1` marks slots with
/// no module attached.
#[rustfmt::skip]
pub const MODULE_MAP: [[i16; GROUPS]; LINKS] = [
    [240, 241, 242, 246, 247, 248, 252, 253, 254, 258, 259, 260],
    [264, 265, 266, 270, 271, 272, 276, 277, 278, 282, 283, 284],
    [288, 289, 290, 294, 295, 296, 300, 301, 302, 306, 307, 308],
    [312, 313, 314, 318, 319, 320,  -1,  -1,  -1,  -1,  -1,  -1],
    [243, 244, 245, 249, 250, 251, 255, 256, 257, 261, 262, 263],
    [267, 268, 269, 273, 274, 275, 279, 280, 281, 285, 286, 287],
    [291, 292, 293, 297, 298, 299, 303, 304, 305, 309, 310, 311],
    [315, 316, 317, 321, 322, 323,  -1,  -1,  -1,  -1,  -1,  -1],
    [324, 325, 326, 327, 332, 333, 334, 335, 340, 341, 342, 343],
    [348, 349, 350, 351, 356, 357, 358, 359, 364, 365, 366, 367],
    [372, 373, 374, 375, 380, 381, 382, 383, 388, 389, 390, 391],
    [396, 397, 398, 399, 404, 405, 406, 407, 412, 413, 414, 415],
    [420, 421, 422, 423, 428, 429, 430, 431, 436, 437, 438, 439],
    [444, 445, 446, 447, 452, 453, 454, 455, 460, 461, 462, 463],
    [468, 469, 470, 471, 476, 477, 478, 479, 484, 485, 486, 487],
    [492, 493, 494, 495,  -1,  -1,  -1,  -1,  -1,  -1,  -1,  -1],
    [328, 329, 330, 331, 336, 337, 338, 339, 344, 345, 346, 347],
    [352, 353, 354, 355, 360, 361, 362, 363, 368, 369, 370, 371],
    [376, 377, 378, 379, 384, 385, 386, 387, 392, 393, 394, 395],
    [400, 401, 402, 403, 408, 409, 410, 411, 416, 417, 418, 419],
    [424, 425, 426, 427, 432, 433, 434, 435, 440, 441, 442, 443],
    [448, 449, 450, 451, 456, 457, 458, 459, 464, 465, 466, 467],
    [472, 473, 474, 475, 480, 481, 482, 483, 488, 489, 490, 491],
    [496, 497, 498, 499,  -1,  -1,  -1,  -1,  -1,  -1,  -1,  -1],
];

/// Map a link id onto a row of [`MODULE_MAP`].
///
/// Ids outside the table select row 0 rather than being rejected.
pub fn link_row(link: i32) -> usize {
    match usize::try_from(link) {
        Ok(row) if row < LINKS => row,
        _ => 0,
    }
}

/// Look up the module attached to a channel group of a link row, if any.
pub fn module_id(row: usize, group: u8) -> Option<ModuleId> {
    let id = *MODULE_MAP.get(row)?.get(group as usize)?;
    ModuleId::try_from(id).ok()
}

/// Expand an 8-bit compressed amplitude to the 10-bit linear range.
///
/// Only the low eight bits of `value` take part in the expansion.
pub fn expand_amplitude(value: u32) -> u16 {
    let v = (value & 0xFF) as u16;

    if v & 0x80 == 0 {
        v & 0x7F
    } else if v & 0x40 == 0 {
        0x081 + ((v & 0x3F) << 1)
    } else if v & 0x20 == 0 {
        0x104 + ((v & 0x1F) << 3)
    } else {
        0x208 + ((v & 0x1F) << 4)
    }
}
