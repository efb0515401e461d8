use indexmap::IndexMap;

use super::{ModifierFragment, Mood, Platform, StylePreset};

pub(super) fn styles() -> IndexMap<String, StylePreset> {
    let mut map = IndexMap::new();

    let mut insert = |id: &str, name: &str, description: &str, icon: &str, template: &str| {
        map.insert(
            id.to_string(),
            StylePreset {
                id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                prompt_template: template.to_string(),
                icon: icon.to_string(),
            },
        );
    };

    insert(
        "special-mode",
        "Special Mode",
        "A polished, half-body portrait for a special photo.",
        "star",
        "Create a polished portrait of the person, half body shot, that makes a special photo.",
    );
    insert(
        "studio-headshot",
        "Studio Headshot",
        "High-end studio look with soft lighting and neutral backdrop.",
        "camera",
        "Create a professional, high-end studio headshot of the person. Isolate the subject and place them against a clean, hand-painted canvas background (neutral light grey or soft beige). Use soft, diffuse studio lighting (Rembrandt or butterfly lighting setup) to accentuate facial features gently. Ensure sharp focus on the eyes, natural skin texture, and a shallow depth of field (bokeh) to separate the subject from the background. 8k resolution, photorealistic.",
    );
    insert(
        "corporate",
        "Corporate",
        "Confident, modern business look with architectural depth.",
        "briefcase",
        "Generate a premium corporate portrait. Place the subject in a modern, high-tech office environment with depth. The background should be a blurred (bokeh) open-plan office with glass architectural elements and natural daylight. The subject should be dressed in professional business attire, looking confident and approachable. Use 'golden hour' natural lighting mixed with soft fill light. Composition should follow the rule of thirds. Photorealistic, 85mm lens style.",
    );
    insert(
        "outdoor",
        "Outdoor",
        "Natural, approachable look with soft sunlight.",
        "leaf",
        "Create a lifestyle portrait in a beautiful outdoor setting. Place the subject in a soft-focus park or urban garden environment. Use natural, soft sunlight (golden hour) backlighting to create a rim light effect on the hair. The background should be lush greenery or blurred city texture, creating a friendly and approachable vibe. The image should look like it was taken with a high-aperture portrait lens (f/1.8). High resolution, natural colors.",
    );
    insert(
        "black-and-white",
        "Black & White",
        "A timeless and dramatic high-contrast monochrome portrait.",
        "circle-half",
        "Convert the person in the uploaded photo into a classic, high-contrast black and white portrait. Completely remove the original background and replace it with a simple, dark, or textured gray background. The lighting should be dramatic and cinematic, emphasizing the subject's facial contours. The final image should be a powerful, timeless monochrome headshot. Maintain the subject's likeness.",
    );
    insert(
        "approachable",
        "Approachable",
        "A warm, inviting photo with soft lighting and a cozy background.",
        "coffee",
        "Take the subject from the uploaded photo and place them in a warm, inviting setting like a cozy cafe or a comfortable indoor space with soft lighting. The background should be tastefully blurred. Apply warm color tones to the entire image to create an approachable and friendly vibe. Ensure the subject's face is clearly visible and their original features are maintained.",
    );
    insert(
        "creative",
        "Creative",
        "A bold, modern look with a vibrant, eye-catching background.",
        "lightbulb",
        "Isolate the subject from the uploaded photo, remove the background, and place them against a vibrant, solid color or a simple, abstract graphic background. The lighting should be clean and bright, making the subject pop. This style is for creative professionals who want a bold, modern, and eye-catching profile picture. Preserve the subject's identity perfectly.",
    );
    insert(
        "anime",
        "Anime",
        "Reimagine yourself in a vibrant Japanese anime style.",
        "anime",
        "Transform the person from the uploaded photo into an anime/manga art style. Completely remove the original background and replace it with a dynamic, stylized anime background with speed lines or a soft-focus scenic view. The character should have characteristic features like large expressive eyes and stylized hair, while still retaining a recognizable likeness to the original person.",
    );
    insert(
        "superhero",
        "Superhero",
        "Become a hero with a comic book art transformation.",
        "superhero",
        "Reimagine the person in the photo as a superhero in a modern comic book art style. Completely remove the original background and replace it with a dramatic, action-filled scene, like a cityscape at night or an explosion. The lighting should be heroic and dynamic. Keep the facial likeness of the person but render their clothing and pose in a superhero style.",
    );
    insert(
        "pop-art",
        "Pop Art",
        "A bold, graphic style inspired by Andy Warhol.",
        "pop-art",
        "Convert the photo of the person into a Pop Art style portrait, inspired by Andy Warhol. Isolate the subject, remove the background, and place them on a flat, vibrant, solid-color background. The image should use a limited, high-contrast color palette and posterization effects. Create a bold, graphic, and visually striking image.",
    );

    map
}

pub(super) fn modifiers() -> IndexMap<String, ModifierFragment> {
    [
        (
            "maintain-likeness",
            "Maintain Likeness",
            "Ensure the facial features and likeness of the person in the photo are accurately maintained.",
        ),
        (
            "polish-face",
            "Polish Facial Look",
            "Subtly enhance the facial features, smooth the skin, and give a polished, professional look.",
        ),
        (
            "improve-lighting",
            "Improve Lighting",
            "Adjust the lighting to be more cinematic and flattering, adding depth and dimension.",
        ),
        (
            "vibrant-colors",
            "Vibrant Colors",
            "Boost the color saturation and vibrancy for a more dynamic and eye-catching image.",
        ),
        (
            "photo-realistic",
            "Photo-Realistic",
            "Generate the final image with a high degree of photorealism, focusing on realistic textures and details.",
        ),
        (
            "formal-attire",
            "Formal Attire",
            "Change the clothing to formal business attire, such as a suit or blazer.",
        ),
        (
            "casual-wear",
            "Casual Wear",
            "Change the clothing to casual wear, like a t-shirt or sweater.",
        ),
        (
            "dramatic-mood",
            "Dramatic Mood",
            "Create a dramatic and moody atmosphere with high-contrast lighting and deep shadows.",
        ),
        (
            "soft-focus",
            "Soft Focus BG",
            "Apply a soft-focus effect to the background for a dreamy, artistic look.",
        ),
        (
            "detailed-background",
            "Detailed BG",
            "Add more intricate and interesting details to the background environment.",
        ),
        (
            "vintage-look",
            "Vintage Look",
            "Give the image a vintage or retro film look with specific color grading and grain.",
        ),
        (
            "smile",
            "Add a Smile",
            "Subtly enhance the expression to create a gentle, confident smile.",
        ),
        (
            "adapt-clothing",
            "Adapt Clothing",
            "Intelligently modify the subject's clothing to perfectly match the theme and environment of the selected style.",
        ),
        (
            "full-body",
            "Full Body Shot",
            "Reframe the image as a full-body photograph, capturing the person from head to toe within the scene.",
        ),
    ]
    .into_iter()
    .map(|(id, label, fragment)| {
        (
            id.to_string(),
            ModifierFragment {
                id: id.to_string(),
                label: label.to_string(),
                prompt_fragment: fragment.to_string(),
            },
        )
    })
    .collect()
}

pub(super) fn platforms() -> IndexMap<String, Platform> {
    [
        (
            "linkedin",
            "LinkedIn",
            "16:9",
            "Keep it professional and credible: clean composition, business-appropriate setting, natural confident body language.",
        ),
        (
            "instagram-post",
            "Instagram Post",
            "1:1",
            "Make it scroll-stopping in a square frame: bold focal point, rich color, centered or symmetrical composition.",
        ),
        (
            "instagram-story",
            "Instagram Story",
            "9:16",
            "Compose for a full-screen vertical frame: subject in the middle third, leave calm space at top and bottom for overlays.",
        ),
        (
            "facebook",
            "Facebook",
            "16:9",
            "Aim for warm, relatable and shareable: friendly expressions, everyday settings, clear storytelling.",
        ),
        (
            "tiktok",
            "TikTok",
            "9:16",
            "Go energetic and playful in a vertical frame: dynamic angles, expressive poses, trend-aware styling.",
        ),
        (
            "blog",
            "Blog Header",
            "16:9",
            "Design a wide editorial banner: the subject off-center with generous negative space for a headline.",
        ),
    ]
    .into_iter()
    .map(|(id, name, ratio, guidance)| {
        (
            id.to_string(),
            Platform {
                id: id.to_string(),
                name: name.to_string(),
                aspect_ratio: ratio.to_string(),
                guidance: guidance.to_string(),
            },
        )
    })
    .collect()
}

pub(super) fn moods() -> IndexMap<String, Mood> {
    [
        ("professional", "Professional", "👔"),
        ("casual", "Casual & Friendly", "👋"),
        ("humorous", "Funny / Meme", "😂"),
        ("cartoon", "Cartoon / Illustration", "🎨"),
        ("abstract", "Abstract Art", "🌀"),
        ("minimalist", "Minimalist", "⚪"),
        ("inspirational", "Inspirational", "✨"),
        ("futuristic", "Futuristic / Tech", "🤖"),
        ("dramatic", "Dramatic / Cinematic", "🎬"),
    ]
    .into_iter()
    .map(|(id, label, icon)| {
        (
            id.to_string(),
            Mood {
                id: id.to_string(),
                label: label.to_string(),
                icon: icon.to_string(),
            },
        )
    })
    .collect()
}
