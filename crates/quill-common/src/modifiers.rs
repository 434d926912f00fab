use bitflags::bitflags;

use crate::token::TokenKind;

bitflags! {
    /// Declaration modifiers as a bitset. Invariants over combinations
    /// (e.g. at most one accessibility modifier) are enforced during
    /// semantic analysis, not at parse time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ModifierFlags: u16 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PROTECTED = 1 << 2;
        const STATIC = 1 << 3;
        const VIRTUAL = 1 << 4;
        const OVERRIDE = 1 << 5;
        const ABSTRACT = 1 << 6;
        const EXTERN = 1 << 7;
        const ENFORCED = 1 << 8;
        const INHERIT = 1 << 9;
        const ASYNC = 1 << 10;
        const REF = 1 << 11;
    }
}

impl ModifierFlags {
    /// The flag for a modifier token, or `None` if the token is not a
    /// modifier keyword.
    pub fn from_token(kind: TokenKind) -> Option<ModifierFlags> {
        let flag = match kind {
            TokenKind::Public => ModifierFlags::PUBLIC,
            TokenKind::Private => ModifierFlags::PRIVATE,
            TokenKind::Protected => ModifierFlags::PROTECTED,
            TokenKind::Static => ModifierFlags::STATIC,
            TokenKind::Virtual => ModifierFlags::VIRTUAL,
            TokenKind::Override => ModifierFlags::OVERRIDE,
            TokenKind::Abstract => ModifierFlags::ABSTRACT,
            TokenKind::Extern => ModifierFlags::EXTERN,
            TokenKind::Enforced => ModifierFlags::ENFORCED,
            TokenKind::Inherit => ModifierFlags::INHERIT,
            TokenKind::Async => ModifierFlags::ASYNC,
            TokenKind::Ref => ModifierFlags::REF,
            _ => return None,
        };
        Some(flag)
    }

    /// Number of accessibility modifiers set (`public`, `private`,
    /// `protected`). More than one is a semantic error.
    pub fn accessibility_count(self) -> u32 {
        (self & (ModifierFlags::PUBLIC | ModifierFlags::PRIVATE | ModifierFlags::PROTECTED))
            .bits()
            .count_ones()
    }

    /// Render the set modifiers in canonical declaration order.
    pub fn canonical_names(self) -> Vec<&'static str> {
        const ORDER: [(ModifierFlags, &str); 12] = [
            (ModifierFlags::PUBLIC, "public"),
            (ModifierFlags::PRIVATE, "private"),
            (ModifierFlags::PROTECTED, "protected"),
            (ModifierFlags::STATIC, "static"),
            (ModifierFlags::VIRTUAL, "virtual"),
            (ModifierFlags::OVERRIDE, "override"),
            (ModifierFlags::ABSTRACT, "abstract"),
            (ModifierFlags::EXTERN, "extern"),
            (ModifierFlags::ENFORCED, "enforced"),
            (ModifierFlags::INHERIT, "inherit"),
            (ModifierFlags::ASYNC, "async"),
            (ModifierFlags::REF, "ref"),
        ];
        ORDER
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_token_maps_all_modifiers() {
        assert_eq!(ModifierFlags::from_token(TokenKind::Public), Some(ModifierFlags::PUBLIC));
        assert_eq!(ModifierFlags::from_token(TokenKind::Ref), Some(ModifierFlags::REF));
        assert_eq!(ModifierFlags::from_token(TokenKind::Fn), None);
    }

    #[test]
    fn accessibility_count_flags_conflicts() {
        let ok = ModifierFlags::PUBLIC | ModifierFlags::STATIC;
        assert_eq!(ok.accessibility_count(), 1);
        let conflict = ModifierFlags::PUBLIC | ModifierFlags::PRIVATE;
        assert_eq!(conflict.accessibility_count(), 2);
        assert_eq!(ModifierFlags::STATIC.accessibility_count(), 0);
    }

    #[test]
    fn canonical_names_ordering() {
        let flags = ModifierFlags::STATIC | ModifierFlags::PUBLIC | ModifierFlags::ABSTRACT;
        assert_eq!(flags.canonical_names(), vec!["public", "static", "abstract"]);
    }
}
