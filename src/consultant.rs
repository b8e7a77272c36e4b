//! Rule-based business consultant: service recommendations and a demo
//! website sketch derived from a short questionnaire.
//!
//! Everything here is a pure function of the [`ConsultationForm`].

use serde::{Deserialize, Serialize};

use crate::error::ConsultantError;
use crate::store::model::NewConsultation;

/// Budget answer that selects the cheaper web package.
pub const SMALL_BUDGET: &str = "Under ₹25,000";

/// Timeline answer that selects the faster web schedule.
pub const URGENT_TIMELINE: &str = "ASAP";

/// Palette used when the visitor names no colors.
pub const DEFAULT_PALETTE: [&str; 4] = ["#3B82F6", "#1E40AF", "#F59E0B", "#FFFFFF"];

pub const DEMO_FEATURES: [&str; 6] = [
    "Hero Section with Call-to-Action",
    "About Us Section",
    "Services/Products Showcase",
    "Testimonials",
    "Contact Form",
    "Footer with Social Links",
];

pub const DEMO_PAGES: [&str; 6] = ["Home", "About", "Services", "Portfolio", "Contact", "Blog"];

/// The consultant questionnaire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsultationForm {
    pub business_name: String,
    pub industry: String,
    pub business_type: String,
    pub target_audience: String,
    pub goals: String,
    pub budget: String,
    pub timeline: String,
    pub current_website: String,
    pub competitors: String,
    pub special_requirements: String,
    pub preferred_colors: String,
    pub design_style: String,
}

impl ConsultationForm {
    /// Business name, industry and business type are required.
    pub fn validate(&self) -> Result<(), ConsultantError> {
        if self.business_name.trim().is_empty() {
            return Err(ConsultantError::MissingField("business_name"));
        }
        if self.industry.trim().is_empty() {
            return Err(ConsultantError::MissingField("industry"));
        }
        if self.business_type.trim().is_empty() {
            return Err(ConsultantError::MissingField("business_type"));
        }
        Ok(())
    }

    /// Palette from the comma-separated color answer.
    pub fn palette(&self) -> Vec<String> {
        let colors: Vec<String> = self
            .preferred_colors
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        if colors.is_empty() {
            DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
        } else {
            colors
        }
    }

    /// Row to persist for this consultation, with the generated results.
    pub fn to_record(
        &self,
        recommendations: &[Recommendation],
        demo: Option<&DemoWebsite>,
    ) -> NewConsultation {
        NewConsultation {
            business_name: self.business_name.clone(),
            industry: self.industry.clone(),
            business_type: self.business_type.clone(),
            target_audience: non_empty(&self.target_audience),
            goals: non_empty(&self.goals),
            budget: non_empty(&self.budget),
            timeline: non_empty(&self.timeline),
            current_website: non_empty(&self.current_website),
            competitors: non_empty(&self.competitors),
            special_requirements: non_empty(&self.special_requirements),
            preferred_colors: non_empty(&self.preferred_colors),
            design_style: non_empty(&self.design_style),
            recommendations: serde_json::to_value(recommendations).ok(),
            demo_website: demo.and_then(|d| serde_json::to_value(d).ok()),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One recommended service package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub title: String,
    pub description: String,
    pub features: Vec<String>,
    pub estimated_cost: String,
    pub timeline: String,
    pub priority: Priority,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Recommend service packages for the questionnaire answers.
pub fn recommendations(form: &ConsultationForm) -> Vec<Recommendation> {
    let web_cost = if form.budget == SMALL_BUDGET {
        "₹20,000 - ₹30,000"
    } else {
        "₹35,000 - ₹50,000"
    };
    let web_timeline = if form.timeline == URGENT_TIMELINE {
        "2-3 weeks"
    } else {
        "3-4 weeks"
    };

    let mut recs = vec![
        Recommendation {
            category: "Web Development".into(),
            title: "Custom Business Website".into(),
            description: format!(
                "A professional {} website tailored for {} industry",
                form.design_style.to_lowercase(),
                form.industry.to_lowercase()
            ),
            features: strings(&[
                "Responsive Design",
                "SEO Optimization",
                "Contact Forms",
                "Social Media Integration",
                "Analytics Setup",
                "Mobile Optimization",
            ]),
            estimated_cost: web_cost.into(),
            timeline: web_timeline.into(),
            priority: Priority::High,
        },
        Recommendation {
            category: "Digital Marketing".into(),
            title: "AI-Powered Marketing Strategy".into(),
            description: format!(
                "Comprehensive digital marketing plan targeting {}",
                form.target_audience
            ),
            features: strings(&[
                "SEO Strategy",
                "Social Media Marketing",
                "Content Marketing",
                "PPC Campaigns",
                "Email Marketing",
                "Analytics & Reporting",
            ]),
            estimated_cost: "₹15,000 - ₹25,000/month".into(),
            timeline: "Ongoing".into(),
            priority: Priority::High,
        },
        Recommendation {
            category: "Branding".into(),
            title: "Complete Brand Identity".into(),
            description: "Professional branding package including logo, colors, and brand guidelines"
                .into(),
            features: strings(&[
                "Logo Design",
                "Brand Guidelines",
                "Color Palette",
                "Typography",
                "Business Cards",
                "Social Media Assets",
            ]),
            estimated_cost: "₹12,000 - ₹20,000".into(),
            timeline: "1-2 weeks".into(),
            priority: Priority::Medium,
        },
    ];

    if form.business_type.contains("E-commerce") {
        recs.push(Recommendation {
            category: "E-commerce".into(),
            title: "Online Store Development".into(),
            description: "Full-featured e-commerce platform with payment integration".into(),
            features: strings(&[
                "Product Catalog",
                "Shopping Cart",
                "Payment Gateway",
                "Inventory Management",
                "Order Tracking",
                "Customer Accounts",
            ]),
            estimated_cost: "₹50,000 - ₹1,00,000".into(),
            timeline: "4-6 weeks".into(),
            priority: Priority::High,
        });
    }

    recs
}

/// Sketch of the site we would build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoWebsite {
    pub name: String,
    pub description: String,
    pub features: Vec<String>,
    pub pages: Vec<String>,
    pub design: String,
    pub colors: Vec<String>,
    /// Inline SVG mockup of the landing page.
    pub preview: String,
}

pub fn demo_website(form: &ConsultationForm) -> DemoWebsite {
    let name = non_empty(&form.business_name).unwrap_or_else(|| "Your Business".to_string());
    let colors = form.palette();
    let preview = preview_svg(&name, &form.design_style, &colors);

    DemoWebsite {
        description: format!(
            "A {} website designed for {} businesses",
            form.design_style.to_lowercase(),
            form.industry.to_lowercase()
        ),
        features: strings(&DEMO_FEATURES),
        pages: strings(&DEMO_PAGES),
        design: form.design_style.clone(),
        colors,
        preview,
        name,
    }
}

fn preview_svg(name: &str, design: &str, colors: &[String]) -> String {
    let color = |idx: usize, fallback: &'static str| -> String {
        colors
            .get(idx)
            .map(|c| xml_escape(c))
            .unwrap_or_else(|| fallback.to_string())
    };
    let background = color(0, "#f3f4f6");
    let panel = color(1, "#ffffff");
    let ink = color(2, "#1f2937");
    let card = color(3, "#e5e7eb");

    format!(
        r##"<svg width="600" height="400" xmlns="http://www.w3.org/2000/svg">
  <rect width="600" height="400" fill="{background}"/>
  <rect x="50" y="50" width="500" height="60" fill="{panel}" rx="8"/>
  <text x="300" y="85" text-anchor="middle" fill="{ink}" font-family="Arial" font-size="24" font-weight="bold">{name}</text>
  <rect x="50" y="130" width="240" height="120" fill="{card}" rx="8"/>
  <rect x="310" y="130" width="240" height="120" fill="{card}" rx="8"/>
  <rect x="50" y="270" width="500" height="80" fill="{panel}" rx="8"/>
  <text x="300" y="315" text-anchor="middle" fill="{ink}" font-family="Arial" font-size="16">{design} Design Preview</text>
</svg>"##,
        name = xml_escape(name),
        design = xml_escape(design),
    )
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
