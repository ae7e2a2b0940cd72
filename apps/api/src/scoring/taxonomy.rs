//! Skill Taxonomy: role → skill-keyword lists plus an optional synonym table.
//!
//! Loaded once at startup (built-in or from a JSON file) and shared read-only.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("Failed to read skill taxonomy '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid skill taxonomy JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid skill taxonomy: {0}")]
    Invalid(String),
}

/// One role and its expected skills. Skill order only fixes output ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSkills {
    pub name: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillTaxonomy {
    roles: Vec<RoleSkills>,
    #[serde(default)]
    synonyms: BTreeMap<String, BTreeSet<String>>,
}

impl SkillTaxonomy {
    pub fn new(
        roles: Vec<RoleSkills>,
        synonyms: BTreeMap<String, BTreeSet<String>>,
    ) -> Result<Self, TaxonomyError> {
        let mut seen = HashSet::new();
        let mut trimmed = Vec::with_capacity(roles.len());
        for role in roles {
            let name = role.name.trim().to_string();
            if name.is_empty() {
                return Err(TaxonomyError::Invalid("role name cannot be empty".to_string()));
            }
            if !seen.insert(name.clone()) {
                return Err(TaxonomyError::Invalid(format!("duplicate role '{name}'")));
            }
            trimmed.push(RoleSkills { name, ..role });
        }

        let synonyms = synonyms
            .into_iter()
            .map(|(skill, alternates)| {
                (
                    skill.to_lowercase(),
                    alternates.into_iter().map(|a| a.to_lowercase()).collect(),
                )
            })
            .collect();

        Ok(Self {
            roles: trimmed,
            synonyms,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, TaxonomyError> {
        let raw: SkillTaxonomy = serde_json::from_str(json)?;
        Self::new(raw.roles, raw.synonyms)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, TaxonomyError> {
        let json = std::fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Skills for a role, looked up by exact name after trimming.
    pub fn skills_for(&self, role: &str) -> Option<&[String]> {
        let role = role.trim();
        self.roles
            .iter()
            .find(|r| r.name == role)
            .map(|r| r.skills.as_slice())
    }

    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(|r| r.name.as_str())
    }

    pub fn contains_role(&self, role: &str) -> bool {
        self.skills_for(role).is_some()
    }

    /// Alternate spellings registered for a canonical skill keyword.
    pub fn synonyms_for(&self, skill: &str) -> Option<&BTreeSet<String>> {
        self.synonyms.get(&skill.to_lowercase())
    }
}

impl Default for SkillTaxonomy {
    fn default() -> Self {
        let roles = BUILTIN_ROLES
            .iter()
            .map(|(name, skills)| RoleSkills {
                name: name.to_string(),
                skills: skills.iter().map(|s| s.to_string()).collect(),
            })
            .collect();
        let synonyms = BUILTIN_SYNONYMS
            .iter()
            .map(|(skill, alternates)| {
                (
                    skill.to_string(),
                    alternates.iter().map(|a| a.to_string()).collect(),
                )
            })
            .collect();
        Self { roles, synonyms }
    }
}

const BUILTIN_ROLES: &[(&str, &[&str])] = &[
    (
        "Data Science",
        &[
            "python", "machine learning", "data analysis", "pandas", "numpy", "regression",
            "classification", "deep learning", "nlp", "tensorflow", "keras", "pytorch", "sql",
            "matplotlib", "scikit-learn", "seaborn", "bokeh", "plotly", "data visualization",
            "feature engineering", "supervised learning", "unsupervised learning", "statistics",
            "data wrangling", "data mining", "predictive modeling", "big data", "hadoop", "spark",
            "jupyter", "notebook", "data preprocessing",
        ],
    ),
    (
        "Java Developer",
        &[
            "java", "spring", "spring boot", "hibernate", "jpa", "servlet", "jsp", "maven",
            "gradle", "junit", "rest api", "microservices", "tomcat", "jboss", "eclipse",
            "intellij", "oop", "object oriented", "multithreading", "concurrency", "jdbc", "sql",
            "mysql", "oracle", "git", "json", "xml", "lambda", "streams", "collections",
            "exception handling", "design patterns", "api development", "unit testing", "jenkins",
            "docker", "kubernetes", "aws", "azure", "cloud", "ci/cd", "log4j", "swagger",
            "mockito", "web services", "soap", "restful", "jvm", "garbage collection",
            "performance tuning", "debugging", "deployment", "build automation",
            "version control", "agile", "scrum", "jira", "uml", "data structures", "algorithms",
        ],
    ),
    (
        "Web Development",
        &[
            "html", "css", "javascript", "react", "node.js", "express", "mongodb", "frontend",
            "backend", "api", "rest", "bootstrap", "typescript", "next.js", "redux", "vue",
            "angular", "sass", "less", "webpack", "babel", "graphql", "php", "laravel", "django",
            "flask", "mysql", "sqlite", "postgresql", "responsive design", "ui", "ux",
            "websockets", "jwt", "oauth", "authentication", "authorization", "testing", "jest",
            "mocha", "chai", "cypress", "storybook", "material ui", "tailwind", "vercel",
            "netlify", "heroku", "aws", "azure", "cloud", "api integration", "restful", "soap",
            "web security", "seo", "performance optimization", "pwa", "service worker", "ssr",
            "csr", "spa", "mvc", "mvvm", "git", "github", "bitbucket", "agile", "scrum", "jira",
        ],
    ),
    (
        "Android Development",
        &[
            "java", "kotlin", "android", "xml", "firebase", "android studio", "gradle", "jetpack",
        ],
    ),
    (
        "DevOps",
        &[
            "docker", "kubernetes", "aws", "azure", "jenkins", "ci/cd", "terraform", "ansible",
            "monitoring",
        ],
    ),
    (
        "Testing",
        &[
            "selenium", "junit", "pytest", "test case", "testng", "automation", "manual testing",
        ],
    ),
    (
        "Cloud Computing",
        &["aws", "azure", "gcp", "cloud", "lambda", "ec2", "s3", "devops"],
    ),
    (
        "Cyber Security",
        &[
            "security", "vulnerability", "penetration testing", "firewall", "encryption",
            "network security",
        ],
    ),
    (
        "Networking",
        &[
            "tcp/ip", "dns", "firewall", "vpn", "networking", "routing", "switching", "protocols",
        ],
    ),
    (
        "UI/UX",
        &["figma", "wireframe", "adobe xd", "prototyping", "ui", "ux", "design"],
    ),
    (
        "Business Analyst",
        &[
            "requirement gathering", "data analysis", "process modeling", "excel", "dashboard",
            "power bi", "tableau", "communication", "business process",
        ],
    ),
    (
        "Software Development Engineer (SDE)",
        &[
            "python", "java", "c++", "c#", "software engineering", "object oriented", "oop",
            "data structures", "algorithms", "system design", "problem solving", "git", "github",
            "unit testing", "integration testing", "sql", "rest api", "microservices", "cloud",
            "aws", "azure", "docker", "kubernetes", "linux", "agile", "scrum", "debugging",
            "version control", "design patterns", "code review", "performance optimization",
            "multithreading", "concurrency",
        ],
    ),
    (
        "Full Stack Developer",
        &[
            "html", "css", "javascript", "react", "angular", "vue", "node.js", "express",
            "django", "flask", "spring", "java", "python", "typescript", "mongodb", "mysql",
            "postgresql", "api", "rest", "graphql", "redux", "docker", "git", "github",
            "frontend", "backend", "responsive design", "ui", "ux", "testing", "agile", "scrum",
            "cloud", "aws", "azure", "devops", "ci/cd", "webpack", "babel", "sass", "less",
            "material ui", "tailwind", "heroku", "netlify", "vercel", "jwt", "oauth",
            "authentication", "authorization", "performance optimization",
        ],
    ),
];

const BUILTIN_SYNONYMS: &[(&str, &[&str])] = &[
    ("machine learning", &["ml"]),
    ("deep learning", &["dl"]),
    ("data analysis", &["data analytics", "analytics"]),
    ("nlp", &["natural language processing"]),
    ("scikit-learn", &["sklearn"]),
    ("data wrangling", &["data cleaning"]),
    ("data mining", &["knowledge discovery"]),
    ("big data", &["large scale data"]),
    ("sql", &["structured query language"]),
    ("python", &["py"]),
    ("regression", &["linear regression", "logistic regression"]),
    (
        "classification",
        &["binary classification", "multi-class classification"],
    ),
];
