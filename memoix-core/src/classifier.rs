//! Course, cuisine and spirit classification.
//!
//! Courses come from a priority cascade of named rules; the first rule that
//! fires decides the course and its confidence. Every keyword match is
//! whole-word, so "sour" never matches "sourdough". The keyword tables live in
//! a versioned [`ClassifierRules`] value injected by the caller.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use url::Url;

/// One course keyword tier: a label, its confidence and the words that select it.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseTier {
    pub label: &'static str,
    pub confidence: f32,
    pub keywords: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq)]
pub struct CuisineTier {
    pub label: &'static str,
    /// Matched against title and URL
    pub keywords: &'static [&'static str],
    /// Matched against ingredient names; two hits are needed
    pub ingredient_keywords: &'static [&'static str],
}

/// Read-only keyword tables for the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierRules {
    pub version: u32,
    pub cocktail_sites: &'static [&'static str],
    pub bbq_sites: &'static [&'static str],
    /// Keyword → spirit subcategory
    pub spirits: &'static [(&'static str, &'static str)],
    /// Title words that mark a drink outright
    pub drink_words: &'static [&'static str],
    pub smoking_title_words: &'static [&'static str],
    pub smoking_context_words: &'static [&'static str],
    pub pickle_words: &'static [&'static str],
    pub pickle_ingredients: &'static [&'static str],
    pub modernist_ingredients: &'static [&'static str],
    pub modernist_context: &'static [&'static str],
    pub bread_words: &'static [&'static str],
    pub leaveners: &'static [&'static str],
    pub course_tiers: &'static [CourseTier],
    pub vegetarian_words: &'static [&'static str],
    pub cuisines: &'static [CuisineTier],
}

static BUILTIN: LazyLock<ClassifierRules> = LazyLock::new(|| ClassifierRules {
    version: 4,
    cocktail_sites: &[
        "diffordsguide.com",
        "liquor.com",
        "punchdrink.com",
        "imbibemagazine.com",
        "cocktailsdistilled.com",
        "kindredcocktails.com",
        "thecocktailproject.com",
        "seriousdrinks.com",
    ],
    bbq_sites: &[
        "amazingribs.com",
        "heygrillhey.com",
        "smokingmeatforums.com",
        "traeger.com",
        "meatchurch.com",
        "howtobbqright.com",
        "bbqpitboys.com",
    ],
    spirits: &[
        ("gin", "Gin"),
        ("vodka", "Vodka"),
        ("rum", "Rum"),
        ("tequila", "Tequila"),
        ("mezcal", "Mezcal"),
        ("bourbon", "Whiskey"),
        ("rye whiskey", "Whiskey"),
        ("whiskey", "Whiskey"),
        ("whisky", "Whiskey"),
        ("scotch", "Whiskey"),
        ("brandy", "Brandy"),
        ("cognac", "Brandy"),
        ("pisco", "Brandy"),
        ("absinthe", "Absinthe"),
        ("vermouth", "Vermouth"),
        ("aperol", "Amaro"),
        ("campari", "Amaro"),
        ("amaro", "Amaro"),
        ("chartreuse", "Liqueur"),
        ("cointreau", "Liqueur"),
        ("triple sec", "Liqueur"),
        ("maraschino liqueur", "Liqueur"),
    ],
    drink_words: &[
        "cocktail", "martini", "negroni", "margarita", "daiquiri", "mojito", "manhattan",
        "old fashioned", "sour", "spritz", "highball", "punch", "sangria", "julep", "fizz",
        "collins", "toddy", "smash",
    ],
    smoking_title_words: &[
        "smoked",
        "smoker",
        "smoking",
        "bbq",
        "barbecue",
        "pulled pork",
        "burnt ends",
    ],
    smoking_context_words: &[
        "smoker", "wood chips", "wood chunks", "pellet grill", "pellets", "hickory", "mesquite",
        "applewood", "post oak", "offset",
    ],
    pickle_words: &[
        "pickle", "pickles", "pickled", "pickling", "ferment", "fermented", "fermenting",
        "kimchi", "sauerkraut", "kombucha", "lacto", "brined", "giardiniera", "kvass",
    ],
    pickle_ingredients: &["pickling salt", "pickling spice", "calcium chloride", "pickle crisp"],
    modernist_ingredients: &[
        "sodium alginate", "calcium lactate", "calcium chloride", "agar", "agar agar",
        "xanthan gum", "lecithin", "soy lecithin", "transglutaminase", "methylcellulose",
        "gellan", "sodium citrate", "maltodextrin", "tapioca maltodextrin",
    ],
    modernist_context: &[
        "sous vide", "spherification", "spherify", "immersion circulator", "water bath",
        "foam", "gel", "fluid gel", "siphon", "liquid nitrogen", "dehydrator",
    ],
    bread_words: &[
        "bread", "loaf", "rolls", "buns", "bagel", "bagels", "focaccia", "brioche", "baguette",
        "ciabatta", "sourdough", "challah", "pretzel", "pretzels",
    ],
    leaveners: &[
        "yeast",
        "instant yeast",
        "active dry yeast",
        "starter",
        "sourdough starter",
        "levain",
        "poolish",
    ],
    course_tiers: &[
        CourseTier {
            label: "Drinks",
            confidence: 0.7,
            keywords: &[
                "drink", "drinks", "smoothie", "lemonade", "latte", "cocoa", "eggnog", "shrub",
                "syrup",
            ],
        },
        CourseTier {
            label: "Desserts",
            confidence: 0.75,
            keywords: &[
                "dessert", "desserts", "cake", "cakes", "cupcake", "cupcakes", "cookie", "cookies",
                "brownie", "brownies", "blondies", "pie", "tart", "pudding", "ice cream", "cheesecake",
                "fudge", "mousse", "sorbet", "gelato", "crumble", "cobbler", "frosting", "candy",
                "truffles", "macarons", "custard", "meringue", "tiramisu",
            ],
        },
        CourseTier {
            label: "Pizzas",
            confidence: 0.75,
            keywords: &["pizza", "pizzas", "calzone", "flatbread"],
        },
        CourseTier {
            label: "Sandwiches",
            confidence: 0.7,
            keywords: &[
                "sandwich",
                "sandwiches",
                "burger",
                "burgers",
                "panini",
                "sliders",
                "banh mi",
                "grilled cheese",
            ],
        },
        CourseTier {
            label: "Soups",
            confidence: 0.75,
            keywords: &[
                "soup", "soups", "stew", "chowder", "bisque", "chili", "gazpacho", "broth", "ramen",
                "pho", "consomme",
            ],
        },
        CourseTier {
            label: "Sauces",
            confidence: 0.7,
            keywords: &[
                "sauce", "sauces", "dressing", "vinaigrette", "gravy", "salsa", "pesto", "aioli",
                "mayonnaise", "chutney", "ketchup", "hot sauce", "condiment",
            ],
        },
        CourseTier {
            label: "Rubs",
            confidence: 0.7,
            keywords: &["rub", "rubs", "spice blend", "spice mix", "seasoning", "marinade"],
        },
        CourseTier {
            label: "Brunch",
            confidence: 0.7,
            keywords: &[
                "brunch", "breakfast", "pancake", "pancakes", "waffle", "waffles", "omelet",
                "omelette", "frittata", "french toast", "granola", "muffin", "muffins", "scone",
                "scones", "quiche", "hash", "shakshuka",
            ],
        },
        CourseTier {
            label: "Breads",
            confidence: 0.7,
            keywords: &[
                "bread",
                "loaf",
                "rolls",
                "buns",
                "bagel",
                "bagels",
                "focaccia",
                "brioche",
                "baguette",
                "biscuits",
                "cornbread",
            ],
        },
        CourseTier {
            label: "Apps",
            confidence: 0.65,
            keywords: &[
                "appetizer", "appetizers", "dip", "crostini", "bruschetta", "canapes", "wings",
                "deviled eggs", "hummus", "nachos", "snack", "snacks", "finger food",
            ],
        },
        CourseTier {
            label: "Sides",
            confidence: 0.65,
            keywords: &[
                "side", "sides", "side dish", "salad", "slaw", "coleslaw", "mashed potatoes",
                "pilaf", "fries", "gratin", "roasted vegetables", "stuffing",
            ],
        },
    ],
    vegetarian_words: &["vegan", "vegetarian", "plant-based", "plant based", "meatless", "veggie"],
    cuisines: &[
        CuisineTier {
            label: "Italian",
            keywords: &[
                "italian",
                "pasta",
                "risotto",
                "lasagna",
                "gnocchi",
                "parmigiana",
                "carbonara",
                "bolognese",
                "cacio e pepe",
                "osso buco",
                "tiramisu",
            ],
            ingredient_keywords: &[
                "parmigiano-reggiano",
                "pecorino",
                "pancetta",
                "guanciale",
                "mascarpone",
                "arborio",
                "prosciutto",
            ],
        },
        CuisineTier {
            label: "Mexican",
            keywords: &[
                "mexican",
                "taco",
                "tacos",
                "enchilada",
                "enchiladas",
                "quesadilla",
                "tamales",
                "guacamole",
                "mole",
                "pozole",
                "carnitas",
                "birria",
            ],
            ingredient_keywords: &[
                "tortilla",
                "tortillas",
                "chipotle",
                "cotija",
                "masa",
                "tomatillo",
                "tomatillos",
                "poblano",
                "ancho",
            ],
        },
        CuisineTier {
            label: "Chinese",
            keywords: &[
                "chinese",
                "stir fry",
                "stir-fry",
                "dumpling",
                "dumplings",
                "wonton",
                "wontons",
                "kung pao",
                "chow mein",
                "lo mein",
                "mapo",
                "char siu",
            ],
            ingredient_keywords: &[
                "shaoxing",
                "hoisin",
                "oyster sauce",
                "doubanjiang",
                "sichuan peppercorns",
                "five spice",
            ],
        },
        CuisineTier {
            label: "Japanese",
            keywords: &[
                "japanese",
                "sushi",
                "teriyaki",
                "miso",
                "tempura",
                "katsu",
                "udon",
                "yakitori",
                "okonomiyaki",
                "onigiri",
            ],
            ingredient_keywords: &["mirin", "dashi", "nori", "sake", "kombu", "bonito", "panko"],
        },
        CuisineTier {
            label: "Indian",
            keywords: &[
                "indian", "curry", "masala", "tikka", "dal", "dhal", "biryani", "naan", "paneer",
                "korma", "vindaloo", "chana", "samosa",
            ],
            ingredient_keywords: &[
                "garam masala",
                "ghee",
                "turmeric",
                "cardamom",
                "fenugreek",
                "curry leaves",
                "asafoetida",
            ],
        },
        CuisineTier {
            label: "Thai",
            keywords: &[
                "thai",
                "pad thai",
                "green curry",
                "red curry",
                "tom yum",
                "tom kha",
                "larb",
                "satay",
                "khao soi",
            ],
            ingredient_keywords: &[
                "fish sauce",
                "lemongrass",
                "galangal",
                "kaffir lime",
                "thai basil",
                "palm sugar",
            ],
        },
        CuisineTier {
            label: "Korean",
            keywords: &[
                "korean",
                "kimchi",
                "bulgogi",
                "bibimbap",
                "japchae",
                "tteokbokki",
                "galbi",
            ],
            ingredient_keywords: &["gochujang", "gochugaru", "doenjang"],
        },
        CuisineTier {
            label: "Vietnamese",
            keywords: &["vietnamese", "pho", "banh mi", "bun cha", "spring rolls"],
            ingredient_keywords: &["rice paper", "nuoc cham"],
        },
        CuisineTier {
            label: "French",
            keywords: &[
                "french",
                "coq au vin",
                "ratatouille",
                "bouillabaisse",
                "crepe",
                "crepes",
                "croissant",
                "souffle",
                "cassoulet",
                "beurre blanc",
            ],
            ingredient_keywords: &[
                "gruyere",
                "creme fraiche",
                "herbes de provence",
                "dijon mustard",
                "shallots",
            ],
        },
        CuisineTier {
            label: "Greek",
            keywords: &[
                "greek",
                "gyro",
                "gyros",
                "souvlaki",
                "moussaka",
                "spanakopita",
                "tzatziki",
                "pastitsio",
            ],
            ingredient_keywords: &["feta", "kalamata olives", "phyllo", "oregano"],
        },
        CuisineTier {
            label: "Middle Eastern",
            keywords: &[
                "middle eastern",
                "shawarma",
                "falafel",
                "hummus",
                "shakshuka",
                "kebab",
                "tabbouleh",
                "fattoush",
            ],
            ingredient_keywords: &["tahini", "za'atar", "sumac", "pomegranate molasses", "harissa"],
        },
        CuisineTier {
            label: "Spanish",
            keywords: &[
                "spanish",
                "paella",
                "tapas",
                "patatas bravas",
                "churros",
                "tortilla espanola",
            ],
            ingredient_keywords: &[
                "chorizo",
                "saffron",
                "smoked paprika",
                "manchego",
                "sherry vinegar",
            ],
        },
        CuisineTier {
            label: "American",
            keywords: &[
                "american",
                "mac and cheese",
                "meatloaf",
                "cornbread",
                "buffalo",
                "sloppy joes",
                "pot roast",
                "clam chowder",
            ],
            ingredient_keywords: &[],
        },
    ],
});

impl ClassifierRules {
    pub fn builtin() -> &'static ClassifierRules {
        &BUILTIN
    }
}

impl Default for ClassifierRules {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

/// What the classifier looks at.
#[derive(Debug, Clone, Default)]
pub struct ClassifyInput<'a> {
    pub title: &'a str,
    pub url: &'a str,
    /// Ingredient names (not full lines)
    pub ingredients: &'a [String],
    /// `recipeCategory` or a similar hint from structured data
    pub category_hint: Option<&'a str>,
    /// Description and directions, for rules that need document context
    pub context: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseDecision {
    pub label: &'static str,
    pub confidence: f32,
    /// Spirit for drinks
    pub subcategory: Option<&'static str>,
    /// Name of the rule that fired
    pub rule: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CuisineDecision {
    pub label: &'static str,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub course: CourseDecision,
    pub cuisine: Option<CuisineDecision>,
    /// Every course any keyword tier matched, plus the chosen one
    pub detected_courses: BTreeSet<String>,
    pub detected_cuisines: BTreeSet<String>,
}

/// Lower-cased views of the input shared by all rules.
struct Signals {
    host: String,
    /// Title, URL path words and category hint
    headline: String,
    title: String,
    ingredients: Vec<String>,
    context: String,
}

impl Signals {
    fn new(input: &ClassifyInput) -> Self {
        let parsed = Url::parse(input.url).ok();
        let host = parsed
            .as_ref()
            .and_then(|u| u.host_str())
            .map(|h| h.trim_start_matches("www.").to_lowercase())
            .unwrap_or_default();
        let path = parsed
            .as_ref()
            .map(|u| u.path().replace(['-', '_', '/'], " "))
            .unwrap_or_default();
        let title = input.title.to_lowercase();
        let headline = format!(
            "{} {} {}",
            title,
            path.to_lowercase(),
            input.category_hint.unwrap_or_default().to_lowercase()
        );
        Signals {
            host,
            headline,
            title,
            ingredients: input.ingredients.iter().map(|i| i.to_lowercase()).collect(),
            context: input.context.to_lowercase(),
        }
    }

    fn on_site(&self, sites: &[&str]) -> bool {
        sites
            .iter()
            .any(|site| self.host == *site || self.host.ends_with(&format!(".{site}")))
    }

    fn any_ingredient(&self, words: &[&str]) -> bool {
        self.ingredients.iter().any(|i| contains_any_word(i, words))
    }
}

type Rule = fn(&Signals, &ClassifierRules) -> Option<CourseDecision>;

/// Course rules in priority order; the first that fires wins.
const COURSE_RULES: &[(&str, Rule)] = &[
    ("cocktail_site", cocktail_site),
    ("bbq_site", bbq_site),
    ("spirit", spirit),
    ("smoking", smoking),
    ("pickles", pickles),
    ("modernist", modernist),
    ("bread", bread),
    ("course_keywords", course_keywords),
    ("vegetarian", vegetarian),
];

const DEFAULT_COURSE: CourseDecision = CourseDecision {
    label: "Mains",
    confidence: 0.5,
    subcategory: None,
    rule: "default",
};

/// Classify a recipe's course and cuisine.
pub fn classify(input: &ClassifyInput, rules: &ClassifierRules) -> Classification {
    let signals = Signals::new(input);

    let course = COURSE_RULES
        .iter()
        .find_map(|&(name, rule)| {
            rule(&signals, rules).map(|decision| CourseDecision { rule: name, ..decision })
        })
        .unwrap_or(DEFAULT_COURSE);
    tracing::debug!(
        course = course.label,
        rule = course.rule,
        confidence = course.confidence,
        "classified course"
    );

    let mut detected_courses: BTreeSet<String> = rules
        .course_tiers
        .iter()
        .filter(|tier| contains_any_word(&signals.headline, tier.keywords))
        .map(|tier| tier.label.to_string())
        .collect();
    detected_courses.insert(course.label.to_string());

    let detected_cuisines: BTreeSet<String> = rules
        .cuisines
        .iter()
        .filter(|tier| {
            contains_any_word(&signals.headline, tier.keywords)
                || ingredient_hits(&signals, tier.ingredient_keywords) >= 2
        })
        .map(|tier| tier.label.to_string())
        .collect();

    Classification {
        cuisine: cuisine(&signals, rules),
        course,
        detected_courses,
        detected_cuisines,
    }
}

fn decision(
    label: &'static str,
    confidence: f32,
    subcategory: Option<&'static str>,
) -> Option<CourseDecision> {
    Some(CourseDecision {
        label,
        confidence,
        subcategory,
        rule: "",
    })
}

fn spirit_in(text: &str, rules: &ClassifierRules) -> Option<&'static str> {
    rules
        .spirits
        .iter()
        .find(|(word, _)| contains_word(text, word))
        .map(|(_, spirit)| *spirit)
}

fn spirit_in_ingredients(signals: &Signals, rules: &ClassifierRules) -> Option<&'static str> {
    signals.ingredients.iter().find_map(|i| spirit_in(i, rules))
}

fn cocktail_site(signals: &Signals, rules: &ClassifierRules) -> Option<CourseDecision> {
    if !signals.on_site(rules.cocktail_sites) {
        return None;
    }
    let spirit = spirit_in_ingredients(signals, rules).or_else(|| spirit_in(&signals.title, rules));
    decision("Drinks", 0.95, spirit)
}

fn bbq_site(signals: &Signals, rules: &ClassifierRules) -> Option<CourseDecision> {
    signals
        .on_site(rules.bbq_sites)
        .then_some(())
        .and_then(|()| decision("Smoking", 0.95, None))
}

/// A spirit in the title or ingredients of something drink-shaped: a drink
/// word in the title, or a short list with no baking staples. A rum cake
/// stays a cake.
fn spirit(signals: &Signals, rules: &ClassifierRules) -> Option<CourseDecision> {
    let spirit =
        spirit_in(&signals.title, rules).or_else(|| spirit_in_ingredients(signals, rules))?;
    let drink_titled = contains_any_word(&signals.headline, rules.drink_words);
    let baked = signals.any_ingredient(&[
        "flour",
        "butter",
        "eggs",
        "egg",
        "baking powder",
        "baking soda",
    ]);
    if drink_titled || (!baked && signals.ingredients.len() <= 8) {
        decision("Drinks", 0.75, Some(spirit))
    } else {
        None
    }
}

fn smoking(signals: &Signals, rules: &ClassifierRules) -> Option<CourseDecision> {
    let titled = contains_any_word(&signals.headline, rules.smoking_title_words);
    let smoker_context = contains_any_word(&signals.context, rules.smoking_context_words);
    let smoked_title = contains_any_word(&signals.title, &["smoked", "smoker"]);
    if (titled && smoker_context) || smoked_title || contains_word(&signals.context, "smoker") {
        decision("Smoking", 0.8, None)
    } else {
        None
    }
}

/// Checked before modernist: calcium chloride shows up in both.
fn pickles(signals: &Signals, rules: &ClassifierRules) -> Option<CourseDecision> {
    let titled = contains_any_word(&signals.headline, rules.pickle_words);
    let brine = signals.any_ingredient(rules.pickle_ingredients)
        && contains_any_word(&signals.context, &[
            "brine", "jar", "jars", "ferment", "pickle", "pickles",
        ]);
    (titled || brine).then_some(())?;
    decision("Pickles", 0.8, None)
}

fn modernist(signals: &Signals, rules: &ClassifierRules) -> Option<CourseDecision> {
    let technique_titled = contains_any_word(&signals.headline, &[
        "sous vide",
        "spherification",
        "modernist",
    ]);
    let ingredient = signals.any_ingredient(rules.modernist_ingredients);
    let context = contains_any_word(&signals.context, rules.modernist_context)
        || contains_any_word(&signals.headline, rules.modernist_context);
    (technique_titled || ingredient && context).then_some(())?;
    decision("Modernist", 0.75, None)
}

fn bread(signals: &Signals, rules: &ClassifierRules) -> Option<CourseDecision> {
    let bread_flour = signals.any_ingredient(&["bread flour"])
        || signals.any_ingredient(&[
            "flour",
        ]) && contains_any_word(&signals.headline, rules.bread_words);
    let leavened = signals.any_ingredient(rules.leaveners);
    let sweet = contains_any_word(&signals.headline, &[
        "cake",
        "cookies",
        "cinnamon rolls",
        "donuts",
        "doughnuts",
    ]);
    (bread_flour && leavened && !sweet).then_some(())?;
    decision("Breads", 0.75, None)
}

fn course_keywords(signals: &Signals, rules: &ClassifierRules) -> Option<CourseDecision> {
    if contains_any_word(&signals.title, rules.drink_words) {
        return decision("Drinks", 0.75, None);
    }
    rules
        .course_tiers
        .iter()
        .find(|tier| contains_any_word(&signals.headline, tier.keywords))
        .and_then(|tier| decision(tier.label, tier.confidence, None))
}

fn vegetarian(signals: &Signals, rules: &ClassifierRules) -> Option<CourseDecision> {
    contains_any_word(&signals.headline, rules.vegetarian_words)
        .then_some(())
        .and_then(|()| decision("Vegn", 0.7, None))
}

fn ingredient_hits(signals: &Signals, words: &[&str]) -> usize {
    words
        .iter()
        .filter(|word| signals.ingredients.iter().any(|i| contains_word(i, word)))
        .count()
}

/// Title/URL keywords (0.7), then two or more telltale ingredients (0.6).
fn cuisine(signals: &Signals, rules: &ClassifierRules) -> Option<CuisineDecision> {
    if let Some(tier) = rules
        .cuisines
        .iter()
        .find(|tier| contains_any_word(&signals.headline, tier.keywords))
    {
        return Some(CuisineDecision {
            label: tier.label,
            confidence: 0.7,
        });
    }
    rules
        .cuisines
        .iter()
        .map(|tier| (tier, ingredient_hits(signals, tier.ingredient_keywords)))
        .filter(|(_, hits)| *hits >= 2)
        .max_by_key(|(_, hits)| *hits)
        .map(|(tier, _)| CuisineDecision {
            label: tier.label,
            confidence: 0.6,
        })
}

/// Whole-word (or whole-phrase) containment; both sides lower-case.
pub fn contains_word(haystack: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    haystack.match_indices(word).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + word.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

fn contains_any_word(haystack: &str, words: &[&str]) -> bool {
    words.iter().any(|word| contains_word(haystack, word))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_simple(title: &str, url: &str, ingredients: &[&str]) -> Classification {
        let ingredients: Vec<String> = ingredients.iter().map(|s| s.to_string()).collect();
        let input = ClassifyInput {
            title,
            url,
            ingredients: &ingredients,
            category_hint: None,
            context: "",
        };
        classify(&input, ClassifierRules::builtin())
    }

    #[test]
    fn test_whole_word_matching() {
        assert!(contains_word("whiskey sour", "sour"));
        assert!(!contains_word("sourdough loaf", "sour"));
        assert!(!contains_word("rumble", "rum"));
        assert!(contains_word("dark rum, aged", "rum"));
        assert!(contains_word("salsa-verde", "salsa"));
    }

    #[test]
    fn test_cocktail_site_beats_title_keywords() {
        let result = classify_simple(
            "Chocolate Cake Martini",
            "https://www.diffordsguide.com/cocktails/recipe/123/chocolate-cake",
            &["Vodka", "Chocolate Liqueur"],
        );
        assert_eq!(result.course.label, "Drinks");
        assert_eq!(result.course.confidence, 0.95);
        assert_eq!(result.course.rule, "cocktail_site");
        assert_eq!(result.course.subcategory, Some("Vodka"));
        assert!(result.detected_courses.contains("Desserts"));
    }

    #[test]
    fn test_bbq_site() {
        let result = classify_simple("Coleslaw", "https://amazingribs.com/slaw", &["Cabbage"]);
        assert_eq!(result.course.label, "Smoking");
        assert_eq!(result.course.confidence, 0.95);
    }

    #[test]
    fn test_spirit_in_short_list() {
        let result = classify_simple(
            "The Last Word",
            "https://example.com/last-word",
            &["Gin", "Green Chartreuse", "Maraschino Liqueur", "Lime Juice"],
        );
        assert_eq!(result.course.label, "Drinks");
        assert_eq!(result.course.confidence, 0.75);
        assert_eq!(result.course.subcategory, Some("Gin"));
    }

    #[test]
    fn test_rum_cake_is_dessert() {
        let result = classify_simple(
            "Rum Cake",
            "https://example.com/rum-cake",
            &["Flour", "Butter", "Sugar", "Eggs", "Dark Rum"],
        );
        assert_eq!(result.course.label, "Desserts");
        assert_eq!(result.course.subcategory, None);

        let result = classify_simple("Gin Fizz", "", &[
            "Gin",
            "Lemon Juice",
            "Egg White",
            "Soda Water",
        ]);
        assert_eq!(result.course.label, "Drinks");
        assert_eq!(result.course.subcategory, Some("Gin"));
    }

    #[test]
    fn test_pickles_before_modernist() {
        let ingredients = vec!["Cucumbers".to_string(), "Calcium Chloride".to_string()];
        let input = ClassifyInput {
            title: "Crisp Dill Spears",
            url: "https://example.com/dill-spears",
            ingredients: &ingredients,
            category_hint: None,
            context: "pack the jars and pour the brine over. use a water bath.",
        };
        let result = classify(&input, ClassifierRules::builtin());
        assert_eq!(result.course.label, "Pickles");
        assert_eq!(result.course.confidence, 0.8);
    }

    #[test]
    fn test_modernist_needs_context() {
        let ingredients = vec!["Sodium Alginate".to_string(), "Mango Puree".to_string()];
        let with_context = ClassifyInput {
            title: "Mango Caviar",
            url: "",
            ingredients: &ingredients,
            category_hint: None,
            context: "drop the mixture into the calcium bath to spherify.",
        };
        assert_eq!(classify(&with_context, ClassifierRules::builtin()).course.label, "Modernist");

        let without = ClassifyInput { context: "", ..with_context };
        assert_eq!(classify(&without, ClassifierRules::builtin()).course.label, "Mains");
    }

    #[test]
    fn test_bread() {
        let result = classify_simple(
            "Weekend Loaf",
            "https://example.com/weekend-loaf",
            &["Bread Flour", "Water", "Instant Yeast", "Salt"],
        );
        assert_eq!(result.course.label, "Breads");
        assert_eq!(result.course.confidence, 0.75);
    }

    #[test]
    fn test_course_tiers_and_default() {
        assert_eq!(classify_simple("Tomato Soup", "", &[]).course.label, "Soups");
        assert_eq!(classify_simple("Buttermilk Pancakes", "", &[]).course.label, "Brunch");
        assert_eq!(classify_simple("Vegan Tofu Bowl", "", &[]).course.label, "Vegn");
        let default = classify_simple("Roast Chicken", "", &["Chicken"]);
        assert_eq!(default.course, DEFAULT_COURSE);
    }

    #[test]
    fn test_cuisine_tiers() {
        let titled = classify_simple("Chicken Tikka Masala", "", &[]);
        assert_eq!(
            titled.cuisine,
            Some(CuisineDecision {
                label: "Indian",
                confidence: 0.7
            })
        );

        let by_ingredients = classify_simple("Weeknight Noodles", "", &[
            "Fish Sauce",
            "Lemongrass",
            "Rice Noodles",
        ]);
        assert_eq!(by_ingredients.cuisine.map(|c| c.label), Some("Thai"));
        assert!(by_ingredients.detected_cuisines.contains("Thai"));

        assert_eq!(classify_simple("Roast Chicken", "", &["Chicken"]).cuisine, None);
    }
}
