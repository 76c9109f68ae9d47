//! Built-in word list for random boards.

/// Words drawn from when no custom board is supplied.
pub const DEFAULT_WORDS: &[&str] = &[
    "AFRICA", "AGENT", "AIR", "ALIEN", "AMBULANCE", "ANGEL", "ANTARCTICA", "APPLE", "ARM",
    "BACK", "BALL", "BAND", "BANK", "BAR", "BARK", "BAT", "BATTERY", "BEACH", "BEAR", "BED",
    "BELL", "BERLIN", "BOLT", "BOMB", "BOOT", "BOTTLE", "BOW", "BOX", "BRIDGE", "BUCK",
    "BUG", "CANADA", "CAP", "CAR", "CASINO", "CAT", "CELL", "CENTAUR", "CHECK", "CHEST",
    "CHURCH", "CIRCLE", "CLOAK", "CLOCK", "CLOUD", "COMIC", "COPPER", "COTTON", "CRANE",
    "CROWN", "DANCE", "DIAMOND", "DINOSAUR", "DOCTOR", "DRAGON", "DRILL", "EAGLE", "ENGINE",
    "FAIR", "FIRE", "FISH", "FORK", "GHOST", "GLASS", "GOLD", "HONEY", "HOOK", "HORSE",
    "ICE", "JET", "KING", "KNIGHT", "LASER", "LEMON", "LIGHT", "LION", "MARCH", "MOON",
    "NEEDLE", "NINJA", "OCEAN", "OLIVE", "PIANO", "PIRATE", "PLANE", "POOL", "QUEEN",
    "ROBOT", "ROCK", "SATURN", "SHARK", "SHIP", "SPRING", "STAR", "TOWER", "TRAIN", "WAVE",
    "WHALE", "WIND", "WITCH",
];
