// 2048-word mnemonic list, alphabetical. 24-word phrases index into
// this table with 11-bit chunks; see crypto::mnemonic.

pub static ENGLISH: [&str; 2048] = [
    "abandon", "abide", "able", "about", "absent", "absorb", "absurd", "abuse",
    "access", "accident", "accuse", "achieve", "acorn", "acoustic", "acre", "act",
    "action", "actress", "actual", "add", "addict", "adjust", "admit", "adore",
    "adult", "advice", "aerobic", "afford", "afraid", "age", "agenda", "agent",
    "ahead", "aim", "airport", "aisle", "alarm", "album", "alert", "alien",
    "alike", "all", "allow", "ally", "almost", "alone", "alpha", "also",
    "alter", "amateur", "amazing", "amble", "amend", "amount", "ample", "analyst",
    "anchor", "angel", "angle", "angry", "ankle", "announce", "another", "answer",
    "anthem", "antique", "anxiety", "any", "apology", "appear", "approve", "apron",
    "arch", "area", "arena", "arm", "armed", "army", "aroma", "arrange",
    "arrest", "arrow", "art", "artist", "artwork", "ask", "aspect", "aspen",
    "asset", "assist", "asthma", "athlete", "atom", "attack", "attic", "attitude",
    "auburn", "auction", "audit", "aunt", "author", "autumn", "average", "avocado",
    "avoid", "aware", "away", "awful", "awkward", "axis", "baby", "bacon",
    "badge", "bail", "balance", "balcony", "ball", "balm", "banana", "band",
    "banner", "bar", "barely", "bargain", "barley", "barn", "base", "basin",
    "basket", "battle", "bay", "beacon", "beak", "bean", "beard", "beauty",
    "because", "become", "bee", "beef", "before", "behave", "believe", "bell",
    "below", "belt", "benefit", "berry", "betray", "better", "bevel", "beyond",
    "bid", "bike", "bingo", "birch", "bird", "bison", "bitter", "blade",
    "blame", "blast", "blaze", "bleak", "blend", "blind", "blink", "blood",
    "blossom", "blouse", "blur", "blush", "boast", "boat", "body", "bog",
    "bolt", "bomb", "bonfire", "bonus", "boost", "border", "borrow", "bottom",
    "bough", "bowl", "box", "brace", "bracket", "brain", "bramble", "brand",
    "brass", "brawn", "bray", "bread", "breadth", "brew", "brick", "bridge",
    "brief", "bright", "brine", "bring", "brittle", "broccoli", "bronze", "brook",
    "broth", "brother", "brown", "bubble", "bud", "budget", "buffalo", "build",
    "bulb", "bullet", "bun", "bundle", "bunker", "burden", "burger", "burrow",
    "burst", "bush", "bustle", "busy", "buyer", "buzz", "cabin", "cable",
    "cafe", "cage", "calf", "call", "camel", "camera", "can", "cancel",
    "candle", "cane", "cannon", "canopy", "canvas", "capable", "cape", "captain",
    "car", "caravan", "carbon", "cargo", "carol", "carry", "carve", "case",
    "casino", "cask", "castle", "casual", "catalog", "catch", "cattle", "caught",
    "caution", "cave", "ceiling", "cellar", "cement", "century", "cereal", "chair",
    "chalk", "change", "chant", "chapter", "charge", "chart", "chase", "cheap",
    "check", "cheese", "cherish", "cherry", "chest", "chicken", "child", "chill",
    "chimney", "chin", "choice", "choose", "chorus", "chronic", "chunk", "cider",
    "cigar", "cinnamon", "circle", "city", "civil", "clap", "clarify", "clause",
    "claw", "clean", "cleat", "clench", "clerk", "cliche", "client", "cliff",
    "cling", "clinic", "cloak", "clock", "close", "cloth", "clover", "clown",
    "clue", "clump", "clutch", "coal", "coarse", "coax", "cobble", "coconut",
    "code", "coil", "coin", "cold", "collar", "color", "column", "come",
    "comet", "comic", "company", "concert", "cone", "confirm", "connect", "consider",
    "convince", "cook", "cope", "copper", "coral", "cord", "cork", "corner",
    "correct", "cotton", "couch", "couple", "course", "cove", "cover", "crab",
    "crack", "craft", "craggy", "crane", "crash", "crater", "crayon", "crazy",
    "credit", "creek", "crew", "crib", "crime", "crisp", "croak", "crop",
    "crouch", "crow", "crown", "cruel", "cruise", "crunch", "crush", "cry",
    "crystal", "cube", "cuff", "cup", "cupboard", "curd", "curious", "current",
    "curtain", "cushion", "cute", "cycle", "dab", "dad", "daisy", "damage",
    "dance", "danger", "daring", "dart", "date", "daughter", "day", "deal",
    "dean", "debris", "debut", "december", "decide", "decline", "decorate", "deed",
    "deem", "defense", "define", "degree", "delay", "delta", "demise", "denial",
    "dentist", "deny", "depend", "deposit", "depth", "deputy", "describe", "desert",
    "desk", "despair", "detail", "develop", "device", "dew", "diagram", "diamond",
    "diary", "diesel", "diet", "digital", "dignity", "dime", "dimple", "dingy",
    "dinner", "dip", "dirt", "disagree", "disease", "dish", "dismiss", "disorder",
    "distance", "ditch", "divide", "divorce", "dock", "doctor", "dodge", "dog",
    "doll", "domain", "dome", "donkey", "donor", "dose", "double", "dour",
    "dove", "doze", "drab", "dragon", "drain", "drape", "draw", "dread",
    "dreary", "dredge", "drift", "drill", "drip", "drive", "drone", "drop",
    "drum", "dry", "duck", "dugout", "dull", "dune", "during", "dust",
    "dutch", "dwarf", "dwell", "eager", "eagle", "earn", "earnest", "easel",
    "easily", "easy", "ebony", "echo", "economy", "eddy", "edit", "educate",
    "eerie", "effort", "eight", "either", "elder", "electric", "element", "elephant",
    "elite", "elm", "else", "ember", "emblem", "emboss", "embrace", "emotion",
    "employ", "empty", "enable", "enamel", "end", "endless", "enemy", "energy",
    "engage", "engine", "enhance", "enjoy", "enough", "enrich", "ensure", "enter",
    "entire", "entry", "envy", "episode", "equip", "erase", "ergo", "erosion",
    "error", "escape", "essay", "estate", "etch", "ether", "ethics", "evidence",
    "evil", "evolve", "exact", "example", "exchange", "excite", "excuse", "execute",
    "exhaust", "exhibit", "exist", "exit", "expand", "expect", "explain", "expose",
    "extend", "eye", "eyebrow", "fabric", "face", "fade", "faint", "fairy",
    "faith", "fall", "false", "family", "famous", "fancy", "fantasy", "fare",
    "fashion", "fat", "father", "fatigue", "favorite", "fawn", "feather", "feature",
    "federal", "fedora", "feed", "feel", "felt", "fence", "fern", "fest",
    "festival", "fever", "few", "fickle", "fiction", "field", "fife", "figure",
    "file", "film", "fin", "final", "find", "finger", "fir", "fire",
    "firm", "first", "fish", "fit", "fix", "fjord", "flail", "flair",
    "flame", "flannel", "flap", "flash", "flask", "flavor", "fleck", "fleet",
    "flick", "fling", "flint", "flit", "float", "floor", "flour", "flower",
    "fluff", "fluid", "flute", "fly", "foam", "focus", "fog", "foil",
    "follow", "fond", "font", "food", "forage", "ford", "forest", "forget",
    "fork", "fortune", "forum", "fossil", "foster", "found", "fowl", "foyer",
    "fragile", "freckle", "fresh", "friend", "frill", "fringe", "fritter", "frock",
    "frond", "front", "froth", "frown", "fruit", "fudge", "fumble", "fume",
    "fungus", "funny", "furnace", "fuse", "fuss", "fuzzy", "gable", "gain",
    "galaxy", "gallery", "gallon", "game", "gander", "gape", "garbage", "garden",
    "garlic", "garment", "gasp", "gate", "gauge", "gauze", "gaze", "gear",
    "gem", "general", "genre", "gentle", "gesture", "ghost", "giant", "giggle",
    "gild", "gilt", "ginger", "girl", "give", "glance", "gland", "glass",
    "glaze", "glean", "glide", "glimpse", "globe", "gloom", "gloss", "glove",
    "glue", "gnome", "goddess", "gold", "goose", "gopher", "gorilla", "gospel",
    "gourd", "gown", "grab", "graft", "grain", "grant", "grape", "grasp",
    "grass", "gravel", "gravity", "great", "green", "grief", "grin", "grind",
    "groan", "grocery", "groove", "group", "grow", "growl", "grunt", "guard",
    "guide", "guilt", "gulf", "gull", "gun", "gust", "gutter", "habit",
    "hail", "hale", "half", "ham", "hamlet", "hamster", "hand", "happy",
    "harbor", "hare", "harsh", "harvest", "hasty", "hat", "haul", "have",
    "hawk", "hay", "haze", "hazel", "health", "heap", "hearth", "heath",
    "hedge", "heed", "hefty", "heir", "hello", "help", "hen", "herd",
    "hermit", "heron", "hew", "high", "hill", "hint", "hire", "history",
    "hoard", "hobby", "hog", "hoist", "hole", "holiday", "holly", "hom",
    "hone", "honey", "hood", "hoof", "hoop", "hope", "horde", "hornet",
    "horror", "hospital", "host", "hound", "hour", "hover", "howl", "hue",
    "huff", "hull", "human", "humble", "humor", "hundred", "hunt", "hurdle",
    "hurt", "husband", "husk", "hut", "hybrid", "hymn", "iceberg", "icing",
    "icy", "identify", "idiom", "igloo", "ignore", "illegal", "illness", "imitate",
    "immense", "impact", "impose", "impulse", "inch", "income", "index", "indicate",
    "industry", "infant", "inform", "inhale", "initial", "inject", "inlet", "inmate",
    "innocent", "input", "insane", "insect", "inspire", "intact", "interest", "invest",
    "invite", "iris", "irk", "island", "isle", "issue", "itch", "ivory",
    "ivy", "jacket", "jaguar", "jam", "jaunt", "jaw", "jazz", "jealous",
    "jelly", "jest", "jewel", "jig", "job", "join", "jolt", "jostle",
    "journey", "judge", "jug", "jumble", "jumbo", "jungle", "junior", "jury",
    "just", "jute", "kale", "kayak", "kazoo", "keen", "keg", "kelp",
    "kernel", "ketchup", "key", "kick", "kidney", "kiln", "kind", "kingdom",
    "kiosk", "kiss", "kitchen", "kite", "kiwi", "knead", "knee", "knife",
    "knit", "knoll", "knot", "lab", "label", "lace", "ladder", "lair",
    "lake", "lamp", "lane", "language", "lapel", "lapse", "larch", "large",
    "lash", "lasso", "later", "lathe", "lattice", "laugh", "lava", "law",
    "lawsuit", "lazy", "leach", "leader", "leaf", "learn", "leave", "ledge",
    "leek", "left", "leg", "legend", "leisure", "lend", "lens", "leopard",
    "letter", "level", "levy", "liar", "library", "license", "lick", "lid",
    "lift", "light", "lilac", "lily", "limber", "limit", "limp", "linger",
    "link", "lion", "lip", "lisp", "list", "live", "lizard", "loaf",
    "loam", "lobby", "local", "lock", "loft", "log", "loin", "loll",
    "long", "loom", "loop", "lore", "lotus", "loud", "love", "low",
    "lucky", "lull", "lumber", "lump", "lunar", "lunge", "lure", "lush",
    "lute", "lynx", "lyrics", "machine", "mad", "magnet", "maid", "main",
    "make", "mallet", "mammal", "man", "mandate", "mane", "manor", "mansion",
    "manual", "maple", "march", "mare", "marine", "marriage", "marsh", "mask",
    "mass", "master", "mat", "material", "math", "matter", "mature", "maximum",
    "maze", "mean", "measure", "mechanic", "media", "meek", "melody", "melon",
    "member", "memory", "mention", "menu", "mere", "merge", "merry", "mesa",
    "mess", "metal", "method", "middle", "midge", "mild", "milk", "million",
    "mimic", "mince", "mind", "mink", "minor", "minute", "miracle", "mirth",
    "miss", "mist", "mite", "mitten", "mixed", "mixture", "moat", "mobile",
    "mock", "model", "mold", "mole", "mom", "monarch", "monitor", "monster",
    "month", "moose", "mop", "more", "morning", "mosquito", "moss", "mother",
    "motion", "mound", "mount", "mourn", "move", "movie", "much", "mud",
    "mug", "mulch", "mull", "multiply", "murmur", "muscle", "mushroom", "music",
    "must", "mutual", "myself", "myth", "nag", "naive", "name", "nape",
    "napkin", "nasty", "nation", "navy", "near", "neck", "need", "negative",
    "neither", "nephew", "nest", "net", "neutral", "never", "newt", "next",
    "nibble", "nice", "nick", "night", "nip", "nod", "noise", "noodle",
    "nook", "normal", "north", "notable", "notch", "nothing", "notice", "novel",
    "now", "nudge", "numb", "nurse", "nutmeg", "nuzzle", "oar", "oasis",
    "oatmeal", "obey", "oblige", "obscure", "obtain", "obvious", "ocean", "ocher",
    "odd", "odor", "off", "office", "often", "oil", "okay", "olive",
    "olympic", "omit", "once", "onion", "online", "onset", "onyx", "open",
    "opinion", "oppose", "orange", "orbit", "orchid", "order", "ore", "organ",
    "original", "orphan", "other", "otter", "outdoor", "outfit", "output", "oval",
    "oven", "owl", "own", "ox", "oxygen", "ozone", "pace", "paddle",
    "page", "pair", "paisley", "pale", "panda", "pane", "pang", "panic",
    "pant", "panther", "parade", "parent", "parka", "parrot", "party", "pass",
    "pat", "path", "patient", "pattern", "pause", "paw", "pawn", "pea",
    "peace", "peal", "peanut", "pearl", "peasant", "pebble", "peck", "peer",
    "pelt", "pen", "pencil", "peony", "pep", "pepper", "perfect", "permit",
    "pest", "pet", "pew", "pewter", "photo", "physical", "piano", "picnic",
    "picture", "pier", "pig", "pike", "pill", "pinch", "pine", "pint",
    "pioneer", "pistol", "pit", "pitcher", "pivot", "pizza", "plaid", "plain",
    "plank", "plastic", "play", "plaza", "please", "pleat", "plight", "plod",
    "plow", "pluck", "plug", "plume", "plunge", "ply", "poach", "poem",
    "poet", "poise", "poke", "pole", "police", "pollen", "pompom", "pond",
    "pool", "popular", "pore", "pork", "portly", "pose", "posse", "possible",
    "post", "potato", "pouch", "pounce", "pout", "powder", "power", "prairie",
    "praise", "prawn", "predict", "prefer", "prepare", "pretty", "prevent", "pride",
    "prim", "primp", "print", "prison", "privy", "prize", "problem", "process",
    "profit", "program", "promote", "prong", "propel", "property", "protect", "proud",
    "prow", "prune", "pry", "puck", "pudding", "puff", "pug", "pulp",
    "pulse", "pun", "punch", "pup", "pupil", "purchase", "purity", "purr",
    "push", "put", "puzzle", "pyramid", "quail", "quaint", "quality", "qualm",
    "quarry", "quarter", "quay", "queen", "quest", "quick", "quill", "quip",
    "quirk", "quiver", "quiz", "rabbit", "raccoon", "rack", "radar", "raft",
    "rafter", "rail", "rain", "rake", "ram", "ramp", "ranch", "random",
    "range", "rapid", "rascal", "rasp", "rather", "rattle", "ravine", "raw",
    "razor", "real", "ream", "reason", "rebel", "recall", "receive", "record",
    "recycle", "reed", "reef", "reflect", "reform", "region", "regret", "rein",
    "relax", "release", "relish", "rely", "remember", "remind", "rend", "render",
    "rent", "reopen", "repeat", "replace", "require", "resemble", "resin", "resource",
    "response", "retire", "retreat", "reunion", "reveal", "reward", "rhubarb", "rib",
    "ribbon", "rich", "riddle", "ridge", "rift", "right", "rim", "rind",
    "rinse", "riot", "ripe", "ripple", "ritual", "rival", "road", "roam",
    "roar", "robin", "robot", "rocket", "rod", "romance", "romp", "rook",
    "rookie", "roost", "root", "rose", "rot", "rotor", "rough", "route",
    "row", "royal", "rudder", "rude", "rug", "rule", "rump", "run",
    "rung", "runt", "rural", "rust", "rye", "sad", "saddle", "safe",
    "sag", "sail", "salad", "salon", "salt", "same", "sample", "sap",
    "sash", "satin", "satisfy", "sauce", "sausage", "save", "saw", "say",
    "scale", "scalp", "scan", "scare", "scatter", "scene", "school", "science",
    "scoff", "scoop", "scoot", "scorch", "score", "scout", "scowl", "scrawl",
    "scree", "screw", "script", "scrub", "scuff", "scurry", "scythe", "seam",
    "search", "season", "second", "secret", "security", "sedge", "seek", "seep",
    "segment", "select", "seminar", "senior", "sentence", "serene", "serpent", "session",
    "settle", "seven", "shack", "shaft", "shale", "shank", "shard", "shawl",
    "shear", "sheen", "sheep", "shelf", "sheriff", "shield", "shin", "shine",
    "ship", "shiver", "shock", "shoe", "shook", "shoot", "shore", "shorn",
    "shoulder", "shout", "shred", "shrimp", "shrub", "shuffle", "shun", "shy",
    "sibling", "side", "siege", "sight", "sign", "silk", "silly", "silver",
    "simple", "since", "sing", "sip", "siren", "sister", "six", "size",
    "skate", "sketch", "skid", "skiff", "skim", "skimp", "skip", "skull",
    "slab", "slate", "sled", "sleep", "sleet", "slice", "slick", "slight",
    "slim", "slink", "sliver", "sloop", "slot", "sloth", "slush", "small",
    "smelt", "smile", "smoke", "smooth", "snack", "snag", "snake", "snap",
    "snarl", "sneak", "snip", "snout", "snow", "soap", "soar", "soccer",
    "social", "sod", "soda", "soft", "soggy", "soldier", "sole", "solution",
    "someone", "song", "soon", "soot", "sort", "soul", "soup", "source",
    "sow", "space", "span", "spar", "spark", "sparrow", "spatial", "speak",
    "special", "speed", "spell", "sphere", "sphinx", "spider", "spike", "spirit",
    "split", "sponsor", "spool", "sport", "spout", "spray", "sprig", "spring",
    "sprout", "spruce", "spur", "spy", "squeeze", "squirrel", "stack", "stadium",
    "stage", "stairs", "stalk", "stamp", "stand", "start", "state", "stave",
    "stay", "steed", "steel", "steer", "stein", "step", "stereo", "stick",
    "stilt", "sting", "stock", "stoke", "stomp", "stone", "story", "stout",
    "stow", "strand", "straw", "stray", "stride", "strike", "struggle", "stub",
    "student", "stumble", "stump", "sturdy", "style", "submit", "subway", "such",
    "sudden", "suffer", "sugar", "suit", "sumac", "summer", "sunny", "sunset",
    "supply", "supreme", "surf", "surface", "surprise", "surround", "suspect", "sustain",
    "swamp", "swan", "swarm", "sway", "swear", "swelter", "swift", "swing",
    "switch", "sword", "symbol", "syrup", "system", "table", "tackle", "taffy",
    "tail", "talent", "talon", "tame", "tang", "tank", "target", "tarp",
    "task", "tassel", "tattoo", "taut", "taxi", "teach", "teal", "tease",
    "tell", "tenant", "tennis", "term", "test", "text", "thank", "thaw",
    "theme", "theory", "there", "thicket", "thing", "this", "thought", "three",
    "thrift", "thrive", "throw", "thud", "thunder", "thyme", "tick", "ticket",
    "tide", "tiger", "till", "timber", "time", "tinge", "tint", "tip",
    "tired", "title", "toad", "tobacco", "today", "toe", "together", "toilet",
    "tomato", "tomb", "tone", "tongs", "tonic", "tonight", "tooth", "top",
    "topple", "torch", "torrent", "tortoise", "tot", "total", "tourist", "toward",
    "tower", "toy", "track", "traffic", "tragic", "transfer", "trap", "travel",
    "trawl", "tread", "treat", "trellis", "trend", "tress", "trial", "tribe",
    "trickle", "trigger", "trim", "trip", "trouble", "trough", "trove", "truck",
    "true", "truly", "truss", "truth", "try", "tuck", "tuft", "tuition",
    "tulip", "tumult", "tuna", "tunic", "tunnel", "turkey", "turn", "tusk",
    "tweed", "twelve", "twice", "twig", "twirl", "twist", "type", "typical",
    "ugly", "umber", "unable", "unaware", "uncover", "under", "unfair", "unfold",
    "unhappy", "unique", "unit", "unknown", "unlock", "until", "unusual", "update",
    "upgrade", "upon", "upper", "urban", "urge", "usage", "used", "useful",
    "usher", "usual", "vacant", "vacuum", "valid", "valley", "van", "vane",
    "vapor", "various", "vault", "veer", "vehicle", "velvet", "vend", "vent",
    "venture", "verb", "verge", "version", "very", "vest", "veteran", "viable",
    "vibrant", "vicious", "video", "vie", "vigor", "village", "vintage", "viola",
    "virtual", "virus", "vise", "visit", "visual", "vital", "vocal", "void",
    "volcano", "volume", "vote", "voyage", "wad", "wafer", "waft", "wage",
    "wagon", "wait", "wake", "walk", "walnut", "wand", "want", "ward",
    "warfare", "warm", "wart", "wary", "wasp", "waste", "watt", "wave",
    "way", "wealth", "weapon", "weasel", "weather", "web", "wedding", "weed",
    "weekend", "weft", "weird", "well", "welt", "wet", "whale", "what",
    "wheel", "wheeze", "where", "whet", "whim", "whip", "whisk", "whisper",
    "wide", "width", "wife", "wild", "wilt", "win", "winch", "wine",
    "wing", "winner", "winter", "wisdom", "wise", "wisp", "wit", "woe",
    "wok", "woman", "womb", "woo", "wool", "word", "world", "worry",
    "wove", "wrap", "wren", "wrestle", "wrist", "write", "yak", "yam",
    "yarn", "yawn", "yearn", "yellow", "yelp", "yield", "yoke", "yonder",
    "you", "youth", "zeal", "zero", "zest", "zinc", "zip", "zoo",
];
