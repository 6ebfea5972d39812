use rand::seq::SliceRandom;

pub const DEFAULT_SUGGESTION_COUNT: usize = 4;

pub const SAMPLE_PROMPTS: [&str; 20] = [
    "An astronaut surfing a cosmic wave in synthwave style",
    "An ancient, dusty library inside a giant hollow tree",
    "A majestic lion with a galaxy-patterned mane, seated on a crystal throne",
    "A cozy cyberpunk ramen shop on a rainy night, neon lights reflecting on the wet pavement",
    "An enchanted forest where the trees bear glowing runes and the river flows with liquid starlight",
    "A Victorian robot serving tea in a lush garden full of exotic flowers",
    "A bioluminescent underwater city inhabited by humanoid sea creatures",
    "A floating market on an alien planet with two moons in the sky",
    "A dragon made entirely of flowers and vines, sleeping in a sunny field",
    "Portrait of a noble Renaissance cat wearing a ruff and a monocle",
    "A surreal desert landscape with melting clocks, in homage to Salvador Dalí",
    "A floating island with a waterfall that pours into the clouds below",
    "A ghostly knight in shining armor riding through a haunted forest",
    "A steam train flying through a twilight sky full of zeppelins",
    "A detailed street scene in feudal Japan with samurai and geishas",
    "A crystal lighthouse on a rocky coast during a magical storm",
    "A giant octopus wearing a bowler hat and reading a book underwater",
    "An extreme close-up of a snowflake revealing intricate geometric patterns",
    "A sleek sports car racing along a rainbow highway in space",
    "A grizzly bear catching salmon under the northern lights",
];

/// `count` distinct sample prompts in random order.
pub fn shuffle(count: usize) -> Vec<&'static str> {
    let mut rng = rand::thread_rng();
    SAMPLE_PROMPTS
        .choose_multiple(&mut rng, count.min(SAMPLE_PROMPTS.len()))
        .copied()
        .collect()
}
