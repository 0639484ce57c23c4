use super::state::StageName;

pub struct StageDefinition {
    pub name: StageName,
    pub display_name: &'static str,
}

pub static STAGES: &[StageDefinition] = &[
    StageDefinition {
        name: StageName::Bypass,
        display_name: "Authentication Bypass",
    },
    StageDefinition {
        name: StageName::PrivEsc,
        display_name: "Privilege Escalation",
    },
    StageDefinition {
        name: StageName::Rce,
        display_name: "RCE",
    },
];

/// Position (1-based) and definition of a stage.
pub fn stage(name: StageName) -> (usize, &'static StageDefinition) {
    let index = match name {
        StageName::Bypass => 0,
        StageName::PrivEsc => 1,
        StageName::Rce => 2,
    };
    (index + 1, &STAGES[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        assert_eq!(stage(StageName::Bypass).0, 1);
        assert_eq!(stage(StageName::PrivEsc).0, 2);
        assert_eq!(stage(StageName::Rce).0, 3);
        assert_eq!(stage(StageName::Rce).1.display_name, "RCE");
        assert_eq!(stage(StageName::PrivEsc).1.name, StageName::PrivEsc);
    }
}
