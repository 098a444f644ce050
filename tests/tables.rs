use anodyne::sans::tables::{
    CODE_LENGTH, GROUPS, LINKS, MODULE_MAP, expand_amplitude, link_row, module_id,
};

#[test]
fn expansion_stays_in_ten_bits() {
    for v in 0..=0xFF {
        assert!(expand_amplitude(v) <= 0x3FF, "{v:#x}");
    }
}

#[test]
fn expansion_branches_are_disjoint_and_increasing() {
    // Each branch covers a contiguous input range and an output range above
    // the previous branch.
    let branches = [(0x00..0x80), (0x80..0xC0), (0xC0..0xE0), (0xE0..0x100)];
    let mut floor = None;

    for inputs in branches {
        let outputs: Vec<u16> = inputs.map(expand_amplitude).collect();

        assert!(outputs.windows(2).all(|w| w[0] < w[1]));

        if let Some(floor) = floor {
            assert!(outputs[0] > floor);
        }
        floor = outputs.last().copied();
    }
}

#[test]
fn expansion_matches_breakpoints() {
    assert_eq!(expand_amplitude(0x00), 0x000);
    assert_eq!(expand_amplitude(0x7F), 0x07F);
    assert_eq!(expand_amplitude(0x80), 0x081);
    assert_eq!(expand_amplitude(0xBF), 0x0FF);
    assert_eq!(expand_amplitude(0xC0), 0x104);
    assert_eq!(expand_amplitude(0xDF), 0x1FC);
    assert_eq!(expand_amplitude(0xE0), 0x208);
    assert_eq!(expand_amplitude(0xFF), 0x3F8);
}

#[test]
fn expansion_ignores_high_bits() {
    assert_eq!(expand_amplitude(0x105), expand_amplitude(0x05));
    assert_eq!(expand_amplitude(0x1C3), expand_amplitude(0xC3));
}

#[test]
fn code_lengths() {
    assert_eq!(CODE_LENGTH, [8, 18, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn every_map_entry_is_a_module_or_vacant() {
    for (row, groups) in MODULE_MAP.iter().enumerate() {
        for (group, &id) in groups.iter().enumerate() {
            match module_id(row, group as u8) {
                Some(module) => assert_eq!(i16::try_from(module), Ok(id)),
                None => assert_eq!(id, -1, "link {row} group {group}"),
            }
        }
    }
}

#[test]
fn modules_are_unique() {
    let mut modules: Vec<u16> = (0..LINKS)
        .flat_map(|row| (0..GROUPS as u8).filter_map(move |group| module_id(row, group)))
        .collect();
    let count = modules.len();

    modules.sort_unstable();
    modules.dedup();

    assert_eq!(modules.len(), count);
    assert_eq!(count, 260);
    assert_eq!(modules.first(), Some(&240));
    assert_eq!(modules.last(), Some(&499));
}

#[test]
fn vacant_slots() {
    assert_eq!(module_id(3, 5), Some(320));
    assert_eq!(module_id(3, 6), None);
    assert_eq!(module_id(15, 3), Some(495));
    assert_eq!(module_id(15, 4), None);
    assert_eq!(module_id(0, 12), None);
}

#[test]
fn links_outside_the_map_use_row_zero() {
    assert_eq!(link_row(0), 0);
    assert_eq!(link_row(23), 23);
    assert_eq!(link_row(24), 0);
    assert_eq!(link_row(-1), 0);
    assert_eq!(link_row(i32::MAX), 0);
}
