use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::category::PresetCategory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylePreset {
    pub id: String,
    pub label: String,
    pub category: PresetCategory,
    pub prompt: String,
}

impl StylePreset {
    pub fn in_category(&self, category: PresetCategory) -> bool {
        self.category == category
    }
}

/// Read-only, ordered collection of style presets keyed by id.
#[derive(Debug, Clone)]
pub struct PresetCatalog {
    presets: IndexMap<String, StylePreset>,
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::new(None)
    }
}

impl PresetCatalog {
    pub fn new(presets: Option<IndexMap<String, StylePreset>>) -> Self {
        Self {
            presets: presets.unwrap_or_else(default_presets),
        }
    }

    pub fn get(&self, id: &str) -> Option<&StylePreset> {
        self.presets.get(id.trim())
    }

    pub fn list(&self) -> impl Iterator<Item = &StylePreset> {
        self.presets.values()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// `None` means every category.
    pub fn filter(&self, category: Option<PresetCategory>) -> Vec<&StylePreset> {
        self.presets
            .values()
            .filter(|preset| category.map_or(true, |wanted| preset.in_category(wanted)))
            .collect()
    }

    /// Categories in the order they first appear in the catalog.
    pub fn categories(&self) -> Vec<PresetCategory> {
        let mut seen = Vec::new();
        for preset in self.presets.values() {
            if !seen.contains(&preset.category) {
                seen.push(preset.category);
            }
        }
        seen
    }
}

fn default_presets() -> IndexMap<String, StylePreset> {
    use PresetCategory::{CloseUp, Creative, Side, Sitting, Standing};

    let mut map = IndexMap::new();

    let mut insert = |id: &str, label: &str, category: PresetCategory, prompt: &str| {
        map.insert(
            id.to_string(),
            StylePreset {
                id: id.to_string(),
                label: label.to_string(),
                category,
                prompt: prompt.to_string(),
            },
        );
    };

    insert(
        "1",
        "Standing - Studio Grey",
        Standing,
        "Full body shot, standing confidently, minimalist grey studio background, professional lighting.",
    );
    insert(
        "2",
        "Standing - Street Fashion",
        Standing,
        "Full body shot, standing on a busy urban street, daylight, blurred city background, street style.",
    );
    insert(
        "3",
        "Standing - Garden",
        Standing,
        "Full body shot, standing in a lush blooming garden, sunlight filtering through leaves, soft dreamy atmosphere.",
    );
    insert(
        "4",
        "Standing - Neon Night",
        Standing,
        "Full body shot, standing in a cyberpunk city street at night, neon blue and pink lighting, dramatic contrast.",
    );
    insert(
        "5",
        "Standing - Beach",
        Standing,
        "Full body shot, standing on a white sand beach, clear blue sky, ocean waves in background, bright natural light.",
    );
    insert(
        "6",
        "Standing - Luxury Hall",
        Standing,
        "Full body shot, standing in a marble luxury hotel lobby, golden chandeliers, elegant atmosphere.",
    );
    insert(
        "31",
        "Standing - Red Carpet",
        Standing,
        "Full body shot, standing on a red carpet event, paparazzi flash photography, glamourous night atmosphere.",
    );
    insert(
        "32",
        "Standing - Desert Dunes",
        Standing,
        "Full body shot, standing on golden sand dunes at sunset, vast desert horizon, warm orange lighting.",
    );
    insert(
        "33",
        "Standing - Snowy Street",
        Standing,
        "Full body shot, standing in a snowy city street, falling snowflakes, winter fashion vibe, cool tones.",
    );
    insert(
        "34",
        "Standing - Art Gallery",
        Standing,
        "Full body shot, standing in a modern art gallery, clean white walls with abstract paintings, sophisticated vibe.",
    );

    insert(
        "7",
        "Sitting - Modern Sofa",
        Sitting,
        "Sitting comfortably on a modern beige sofa, interior design studio setting, soft warm lighting.",
    );
    insert(
        "8",
        "Sitting - Cafe Stool",
        Sitting,
        "Sitting on a high stool in a cozy coffee shop, wooden textures, warm ambient lighting, casual look.",
    );
    insert(
        "9",
        "Sitting - Concrete Steps",
        Sitting,
        "Sitting on concrete steps, urban grunge style, overcast soft lighting, cool tones.",
    );
    insert(
        "10",
        "Sitting - Picnic Grass",
        Sitting,
        "Sitting on green grass in a park, picnic setting, bright sunny day, joyful atmosphere.",
    );
    insert(
        "11",
        "Sitting - Office Chair",
        Sitting,
        "Sitting in a professional ergonomic office chair, glass windows background, corporate setting.",
    );
    insert(
        "12",
        "Sitting - Vintage Armchair",
        Sitting,
        "Sitting in a velvet vintage armchair, dark moody library background, classic elegant style.",
    );
    insert(
        "35",
        "Sitting - Poolside Lounge",
        Sitting,
        "Sitting on a lounge chair by a turquoise swimming pool, sunny summer day, palm trees in background.",
    );
    insert(
        "36",
        "Sitting - Classic Car",
        Sitting,
        "Sitting on the hood of a vintage classic car, retro styling, sunset lighting, nostalgic road trip vibe.",
    );
    insert(
        "37",
        "Sitting - Rooftop Bar",
        Sitting,
        "Sitting at a high-end rooftop bar table, city skyline lights in background, evening cocktail atmosphere.",
    );
    insert(
        "38",
        "Sitting - Library Steps",
        Sitting,
        "Sitting casually on wooden library ladder steps, surrounded by books, academic chic aesthetic.",
    );

    insert(
        "13",
        "Side - Profile Studio",
        Side,
        "Side profile view, standing, solid white background, high key fashion photography.",
    );
    insert(
        "14",
        "Side - Walking Street",
        Side,
        "Side view, walking dynamically down a city crosswalk, motion blur in background, street photography.",
    );
    insert(
        "15",
        "Side - Looking Away",
        Side,
        "Side profile, looking into the distance, mountain landscape background, adventurous vibe.",
    );
    insert(
        "16",
        "Side - Window Reflection",
        Side,
        "Side view, standing near a large window, city skyline reflection, moody sunset lighting.",
    );
    insert(
        "17",
        "Side - Spotlight",
        Side,
        "Side profile, dramatic single spotlight on black background, artistic silhouette.",
    );
    insert(
        "18",
        "Side - Runway",
        Side,
        "Side view, walking on a fashion runway, audience blurred in background, runway lights.",
    );
    insert(
        "39",
        "Side - Subway Motion",
        Side,
        "Side view, standing on a subway platform, speeding train blurred in background, urban cinematic look.",
    );
    insert(
        "40",
        "Side - Forest Trail",
        Side,
        "Side view, walking along a misty forest trail, tall pine trees, soft diffused natural light.",
    );
    insert(
        "41",
        "Side - Balcony View",
        Side,
        "Side view, leaning on a balcony railing, overlooking a Mediterranean coast, bright and airy.",
    );
    insert(
        "42",
        "Side - Concrete Wall",
        Side,
        "Side view, leaning against a raw concrete wall, industrial architecture, sharp shadows.",
    );

    insert(
        "19",
        "Upper Body - Portrait",
        CloseUp,
        "Upper body portrait, looking at camera, soft studio lighting, neutral bokeh background.",
    );
    insert(
        "20",
        "Upper Body - Golden Hour",
        CloseUp,
        "Upper body shot, outdoor golden hour sunlight, lens flare, warm cinematic look.",
    );
    insert(
        "21",
        "Detail - Product Focus",
        CloseUp,
        "Close up shot focusing on the product details, shallow depth of field, macro photography style.",
    );
    insert(
        "22",
        "Portrait - Black & White",
        CloseUp,
        "Black and white portrait, high contrast, dramatic shadows, timeless fashion look.",
    );
    insert(
        "23",
        "Upper Body - Floral",
        CloseUp,
        "Upper body shot, surrounded by hanging flowers, spring fashion theme, pastel colors.",
    );
    insert(
        "24",
        "Upper Body - Tech",
        CloseUp,
        "Upper body shot, clean white tech minimalist background, futuristic lighting.",
    );
    insert(
        "43",
        "Upper Body - Rain Glass",
        CloseUp,
        "Upper body shot, seen through a rainy glass window, water droplets, moody blue tones.",
    );
    insert(
        "44",
        "Upper Body - Prism",
        CloseUp,
        "Upper body shot, artistic light leaks and prism refractions, dreamy rainbow effects.",
    );
    insert(
        "45",
        "Upper Body - Noir",
        CloseUp,
        "Upper body shot, film noir style, venetian blind shadows across face, mysterious atmosphere.",
    );
    insert(
        "46",
        "Upper Body - Neon Bokeh",
        CloseUp,
        "Upper body shot, night city background with colorful round bokeh lights, shallow depth of field.",
    );

    insert(
        "25",
        "Creative - Floating",
        Creative,
        "Surreal concept, model appears to be floating, blue sky with fluffy clouds background.",
    );
    insert(
        "26",
        "Creative - Color Pop",
        Creative,
        "Fashion pop art style, bright solid color geometric background, bold contrast.",
    );
    insert(
        "27",
        "Creative - Mirror",
        Creative,
        "Reflection in a shattered mirror, artistic fragmentation, edgy fashion editorial.",
    );
    insert(
        "28",
        "Creative - Forest Fog",
        Creative,
        "Standing in a dense misty forest, cinematic mysterious atmosphere, dark green tones.",
    );
    insert(
        "29",
        "Creative - Studio Smoke",
        Creative,
        "Studio shot with colored smoke effects, dynamic movement, high fashion creative.",
    );
    insert(
        "30",
        "Creative - Glitch",
        Creative,
        "Cyberpunk style, digital glitch effects overlay, neon background, futuristic fashion.",
    );
    insert(
        "47",
        "Creative - Underwater",
        Creative,
        "Underwater fashion photography, weightless hair and fabric, caustic light patterns, ethereal blue.",
    );
    insert(
        "48",
        "Creative - Paper Cutout",
        Creative,
        "Model placed inside a layered paper cutout art style world, craft aesthetic, soft shadows.",
    );
    insert(
        "49",
        "Creative - Cyber Grid",
        Creative,
        "Standing in a virtual reality Tron-like grid world, glowing wireframes, retro-futuristic 80s style.",
    );
    insert(
        "50",
        "Creative - Cloud Realm",
        Creative,
        "Standing on top of clouds, heavenly golden sunlight, fantasy fashion editorial.",
    );

    map
}
