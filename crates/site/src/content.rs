//! Static landing page content.
//!
//! Everything on the landing page except the featured projects is fixed
//! copy, kept here so templates only loop over it.

use aylia_core::NewProject;

/// Public contact address shown in the contact section.
pub const CONTACT_EMAIL: &str = "contact@aylia.dev";

/// A service card.
#[derive(Debug, Clone, Copy)]
pub struct Service {
    pub icon: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
}

/// A headline number (hero and campus sections).
#[derive(Debug, Clone, Copy)]
pub struct Stat {
    pub value: &'static str,
    pub label: &'static str,
}

/// A titled paragraph (campus benefits).
#[derive(Debug, Clone, Copy)]
pub struct Benefit {
    pub title: &'static str,
    pub description: &'static str,
}

pub const SERVICES: &[Service] = &[
    Service {
        icon: "code",
        title: "Web Development",
        description: "Custom web applications built with cutting-edge technologies for optimal performance and user experience.",
        features: &["React & Next.js", "Full-stack Solutions", "Responsive Design"],
    },
    Service {
        icon: "smartphone",
        title: "Mobile Development",
        description: "Native and cross-platform mobile apps that deliver seamless experiences on iOS and Android.",
        features: &["React Native", "iOS & Android", "App Store Deployment"],
    },
    Service {
        icon: "zap",
        title: "Rapid Prototyping",
        description: "Quick MVP development to validate your ideas and bring your vision to life in record time.",
        features: &["Fast Delivery", "Iterative Process", "Market Ready"],
    },
    Service {
        icon: "shield",
        title: "Quality Assurance",
        description: "Comprehensive testing and quality control to ensure your product is bug-free and production-ready.",
        features: &["Automated Testing", "Security Audits", "Performance Optimization"],
    },
    Service {
        icon: "layers",
        title: "Full-Stack Solutions",
        description: "Complete end-to-end development from backend infrastructure to polished frontend interfaces.",
        features: &["Database Design", "API Development", "Cloud Deployment"],
    },
    Service {
        icon: "rocket",
        title: "Deployment & Scaling",
        description: "Launch your product with confidence and scale seamlessly as your user base grows.",
        features: &["CI/CD Pipeline", "Cloud Infrastructure", "Performance Monitoring"],
    },
    Service {
        icon: "palette",
        title: "Graphic Design",
        description: "Eye-catching visual designs that capture your brand identity and engage your audience across all platforms.",
        features: &["Brand Identity & Logos", "UI/UX Design", "Marketing Materials"],
    },
];

pub const HERO_STATS: &[Stat] = &[
    Stat {
        value: "1+",
        label: "Years Experience",
    },
    Stat {
        value: "9+",
        label: "Projects Delivered",
    },
    Stat {
        value: "70%",
        label: "Student Success Rate",
    },
];

pub const CAMPUS_STATS: &[Stat] = &[
    Stat {
        value: "50+",
        label: "Students Mentored",
    },
    Stat {
        value: "9+",
        label: "Projects Completed",
    },
    Stat {
        value: "70%",
        label: "Success Rate",
    },
];

pub const CAMPUS_BENEFITS: &[Benefit] = &[
    Benefit {
        title: "Guided Development",
        description: "Work with experienced mentors who guide you through the entire development process",
    },
    Benefit {
        title: "Real-World Projects",
        description: "Build actual products that solve real problems and look great in your portfolio",
    },
    Benefit {
        title: "Defense Preparation",
        description: "Get expert assistance in preparing and presenting your project for academic defense",
    },
    Benefit {
        title: "Industry Standards",
        description: "Learn professional development practices and industry-standard technologies",
    },
];

pub const WHY_CHOOSE_US: &[&str] = &[
    "One year of proven experience with 9+ successful projects",
    "Specialized in both enterprise and student projects",
    "Professional-grade code and design standards",
    "Comprehensive support from development to deployment",
];

/// (title, description, tags, status) of the default portfolio.
const SHOWCASE: &[(&str, &str, &[&str], &str)] = &[
    (
        "E-Commerce Platform",
        "Full-featured online store with payment integration and inventory management",
        &["React", "Node.js", "Stripe", "MongoDB"],
        "Deployed",
    ),
    (
        "Healthcare Management System",
        "Patient management and appointment scheduling system for medical clinics",
        &["React Native", "Firebase", "TypeScript"],
        "In Production",
    ),
    (
        "Social Media Dashboard",
        "Analytics and management tool for multiple social media platforms",
        &["Next.js", "PostgreSQL", "TailwindCSS"],
        "Deployed",
    ),
    (
        "Real Estate Marketplace",
        "Property listing and search platform with virtual tours",
        &["React", "Express", "AWS", "Three.js"],
        "Deployed",
    ),
    (
        "Educational Learning App",
        "Interactive learning platform with gamification and progress tracking",
        &["React Native", "Supabase", "Redux"],
        "In Production",
    ),
    (
        "Fitness Tracking App",
        "Personal fitness tracker with workout plans and nutrition guidance",
        &["Flutter", "Node.js", "MongoDB"],
        "Deployed",
    ),
];

/// Default portfolio used to seed an empty `featured_projects` table.
///
/// Display order follows list position, starting at 1.
#[must_use]
pub fn showcase_projects() -> Vec<NewProject> {
    SHOWCASE
        .iter()
        .zip(1..)
        .map(|(&(title, description, tags, status), display_order)| NewProject {
            title: title.to_string(),
            description: description.to_string(),
            tags: tags.iter().map(ToString::to_string).collect(),
            status: status.to_string(),
            display_order,
        })
        .collect()
}
