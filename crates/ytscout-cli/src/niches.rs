//! Reference list of niche keywords shown to users picking a search term.

pub(crate) const POPULAR_NICHES: [&str; 27] = [
    "Gaming",
    "Fashion",
    "Beauty",
    "Fitness",
    "Cooking",
    "Travel",
    "Tech Reviews",
    "Music",
    "Comedy",
    "Education",
    "Sports",
    "DIY",
    "Lifestyle",
    "Art",
    "Photography",
    "Business",
    "Finance",
    "Health",
    "Parenting",
    "Pets",
    "Cars",
    "Movies",
    "Books",
    "Science",
    "History",
    "News",
    "Politics",
];

pub(crate) fn print_niches() {
    println!("Popular niches (any keyword works):");
    for niche in POPULAR_NICHES {
        println!("  {niche}");
    }
}

/// One-line teaser with the first ten niches.
pub(crate) fn print_niches_hint() {
    println!("Popular niches: {}...", POPULAR_NICHES[..10].join(", "));
}
