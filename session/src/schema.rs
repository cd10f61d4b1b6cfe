//! The coffee application schema.

use std::fmt;

use brewline_core::Value;
use brewline_registry::{FieldDef, FieldType, Registry, RegistryBuilder, SchemaError};

/// Kinds of drink a recipe can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrinkType {
    Espresso,
    DoubleEspresso,
    RedEye,
    BlackEye,
    Americano,
    LongBlack,
    Macchiato,
    Cortado,
    Breve,
    Cappuccino,
    FlatWhite,
    CafeLatte,
    Mocha,
    Vienna,
    Affogato,
    BlackCoffee,
    IcedCoffee,
}

impl DrinkType {
    pub const ALL: [DrinkType; 17] = [
        DrinkType::Espresso,
        DrinkType::DoubleEspresso,
        DrinkType::RedEye,
        DrinkType::BlackEye,
        DrinkType::Americano,
        DrinkType::LongBlack,
        DrinkType::Macchiato,
        DrinkType::Cortado,
        DrinkType::Breve,
        DrinkType::Cappuccino,
        DrinkType::FlatWhite,
        DrinkType::CafeLatte,
        DrinkType::Mocha,
        DrinkType::Vienna,
        DrinkType::Affogato,
        DrinkType::BlackCoffee,
        DrinkType::IcedCoffee,
    ];

    /// The stored member name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DrinkType::Espresso => "Espresso",
            DrinkType::DoubleEspresso => "Double Espresso",
            DrinkType::RedEye => "Red Eye",
            DrinkType::BlackEye => "Black Eye",
            DrinkType::Americano => "Americano",
            DrinkType::LongBlack => "Long Black",
            DrinkType::Macchiato => "Macchiato",
            DrinkType::Cortado => "Cortado",
            DrinkType::Breve => "Breve",
            DrinkType::Cappuccino => "Cappuccino",
            DrinkType::FlatWhite => "Flat White",
            DrinkType::CafeLatte => "Cafe Latte",
            DrinkType::Mocha => "Mocha",
            DrinkType::Vienna => "Vienna",
            DrinkType::Affogato => "Affogato",
            DrinkType::BlackCoffee => "Black Coffee",
            DrinkType::IcedCoffee => "Iced Coffee",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == name)
    }
}

/// Ways of brewing a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrewMethod {
    Espresso,
    Drip,
    PourOver,
    ColdBrew,
    AeroPress,
    FrenchPress,
    Turkish,
    Percolator,
    MokaPot,
    Instant,
}

impl BrewMethod {
    pub const ALL: [BrewMethod; 10] = [
        BrewMethod::Espresso,
        BrewMethod::Drip,
        BrewMethod::PourOver,
        BrewMethod::ColdBrew,
        BrewMethod::AeroPress,
        BrewMethod::FrenchPress,
        BrewMethod::Turkish,
        BrewMethod::Percolator,
        BrewMethod::MokaPot,
        BrewMethod::Instant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BrewMethod::Espresso => "Espresso",
            BrewMethod::Drip => "Drip",
            BrewMethod::PourOver => "Pour Over",
            BrewMethod::ColdBrew => "Cold Brew",
            BrewMethod::AeroPress => "AeroPress",
            BrewMethod::FrenchPress => "French Press",
            BrewMethod::Turkish => "Turkish",
            BrewMethod::Percolator => "Percolator",
            BrewMethod::MokaPot => "Moka Pot",
            BrewMethod::Instant => "Instant",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.as_str() == name)
    }
}

impl fmt::Display for DrinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for BrewMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DrinkType> for Value {
    fn from(drink: DrinkType) -> Self {
        Value::String(drink.as_str().to_string())
    }
}

impl From<BrewMethod> for Value {
    fn from(method: BrewMethod) -> Self {
        Value::String(method.as_str().to_string())
    }
}

// ==================== Registry ====================

/// Build the registry for the coffee recipe backend.
pub fn coffee_registry() -> Result<Registry, SchemaError> {
    let mut builder = RegistryBuilder::new();

    builder.define_enum("DrinkType", DrinkType::ALL.iter().map(DrinkType::as_str))?;
    builder.define_enum("BrewMethod", BrewMethod::ALL.iter().map(BrewMethod::as_str))?;
    builder
        .define_custom_type("Location")
        .field(FieldDef::new("lat", FieldType::Float))
        .field(FieldDef::new("long", FieldType::Float))
        .done()?;

    builder
        .define_entity("Todo")
        .field(FieldDef::string("content"))
        .done()?;

    builder
        .define_entity("User")
        .field(FieldDef::string("username"))
        .field(FieldDef::string("firstname").required())
        .field(FieldDef::new("email", FieldType::Email).required())
        .field(FieldDef::new("birthday", FieldType::Date))
        .field(FieldDef::id("savedRecipes").array())
        // User or Store ids
        .field(FieldDef::id("following").array())
        .field(FieldDef::id("eventsAttended").array())
        .has_many("myRecipes", "Recipe", "userId")
        .has_many("achievements", "Achievement", "userId")
        .has_many("notifications", "Notification", "userId")
        .has_one("settings", "Settings", "userId")
        .done()?;

    builder
        .define_entity("Recipe")
        .field(FieldDef::id("userId"))
        .field(FieldDef::string("title"))
        .field(FieldDef::new("createdOn", FieldType::DateTime).stamp_on_create())
        .field(FieldDef::enumeration("drinkType", "DrinkType"))
        .field(FieldDef::enumeration("brewMethod", "BrewMethod"))
        .field(FieldDef::id("coffee").array())
        .field(FieldDef::string("drinkAdditions").array())
        .field(FieldDef::string("waterTemp"))
        // input:output, two entries by convention
        .field(FieldDef::string("brewRatio").array())
        .field(FieldDef::string("extractionTime"))
        .field(FieldDef::string("extraNotes"))
        .belongs_to("author", "User", "userId")
        .done()?;

    builder
        .define_entity("Store")
        .field(FieldDef::string("name").required())
        .field(FieldDef::string("address"))
        .field(FieldDef::custom("location", "Location"))
        .field(FieldDef::id("followers").array())
        .field(FieldDef::string("ecommerceAPI"))
        .field(FieldDef::id("transactions").array())
        .field(FieldDef::string("ein"))
        .field(FieldDef::boolean("paymentVerified"))
        .field(FieldDef::id("admins").array())
        .has_many("events", "Event", "storeId")
        .done()?;

    builder
        .define_entity("Event")
        .field(FieldDef::id("storeId"))
        .field(FieldDef::string("title"))
        .field(FieldDef::string("address"))
        .field(FieldDef::custom("location", "Location"))
        .field(FieldDef::new("startTime", FieldType::DateTime))
        .field(FieldDef::new("endTime", FieldType::DateTime))
        .belongs_to("author", "Store", "storeId")
        .done()?;

    builder
        .define_entity("Bean")
        .field(FieldDef::string("name"))
        .field(FieldDef::string("sku"))
        .field(FieldDef::string("flavorProfile"))
        .field(FieldDef::string("origin").array())
        .field(FieldDef::string("process").array())
        .done()?;

    builder
        .define_entity("Settings")
        .field(FieldDef::id("userId"))
        .field(FieldDef::boolean("pushNotify"))
        .field(FieldDef::boolean("events"))
        .field(FieldDef::boolean("inventoryUpdates"))
        .field(FieldDef::boolean("achievements"))
        .field(FieldDef::boolean("following"))
        .belongs_to("user", "User", "userId")
        .done()?;

    for (entity, field) in [
        ("Notification", "message"),
        ("Achievement", "description"),
        ("Transaction", "description"),
    ] {
        let mut definition = builder
            .define_entity(entity)
            .field(FieldDef::id("userId"))
            .field(FieldDef::string(field))
            .belongs_to("user", "User", "userId");
        if entity == "Transaction" {
            // Store the purchase was made at; not a declared relation
            definition = definition.field(FieldDef::id("storeId"));
        }
        definition.done()?;
    }

    builder.build()
}
